// SPDX-License-Identifier: Apache-2.0

//! Frame-interval arithmetic.
//!
//! UVC devices report frame rates as intervals in 100 ns units; user-facing
//! code wants small fractions such as 1/30. Both directions are done in
//! 32-bit arithmetic only, matching what resource-constrained drivers do.

/// Simplify a fraction using a simple continued fraction decomposition.
///
/// Converts fractions such as 333333/10000000 to 1/30. The expansion is
/// truncated as soon as a term reaches `threshold` (keeping at least two
/// terms so the result stays a fraction) or after `max_terms` terms, then
/// re-expanded into a reduced integer fraction. This deliberately trades
/// precision for small values; it is not an exact GCD reduction. 8 and 333
/// for `max_terms` and `threshold` give good results for the intervals
/// devices actually report.
pub fn simplify_fraction(
    numerator: u32,
    denominator: u32,
    max_terms: usize,
    threshold: u32,
) -> (u32, u32) {
    let mut terms = Vec::with_capacity(max_terms);

    // Decompose into a simple continued fraction, stopping on a term at or
    // above the threshold.
    let mut x = numerator;
    let mut y = denominator;

    while terms.len() < max_terms && y != 0 {
        let a = x / y;
        if a >= threshold {
            if terms.len() < 2 {
                terms.push(a);
            }
            break;
        }
        terms.push(a);

        let r = x - a * y;
        x = y;
        y = r;
    }

    // Expand the truncated series back into an integer fraction.
    let mut num = 0u32;
    let mut den = 1u32;

    for &a in terms.iter().rev() {
        let r = den;
        den = a * den + num;
        num = r;
    }

    (den, num)
}

/// Convert a fraction to a frame interval in 100 ns units.
///
/// Computes `numerator / denominator * 10_000_000` in 32-bit fixed point by
/// halving the multiplier and the denominator together until the
/// multiplication cannot overflow. Saturates to `u32::MAX` when the
/// denominator is zero or the ratio is already too large to scale.
pub fn fraction_to_interval(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 || numerator / denominator >= u32::MAX / 10_000_000 {
        return u32::MAX;
    }

    let mut multiplier = 10_000_000u32;
    let mut denominator = denominator;
    while numerator > u32::MAX / multiplier {
        multiplier /= 2;
        denominator /= 2;
    }

    if denominator != 0 {
        numerator * multiplier / denominator
    } else {
        0
    }
}
