// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Args as ClapArgs;
use serde::Serialize;
use uvcgraph::{Colorspace, Device};

use crate::dump;
use crate::error::CliError;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Descriptor dump file (JSON)
    dump: PathBuf,

    /// Only list formats for this streaming interface
    #[arg(short, long)]
    interface: Option<u8>,
}

#[derive(Debug, Serialize)]
struct InterfaceFormats {
    interface: u8,
    endpoint_address: u8,
    max_packet_size: u32,
    formats: Vec<FormatInfo>,
}

#[derive(Debug, Serialize)]
struct FormatInfo {
    index: u8,
    fourcc: String,
    compressed: bool,
    bits_per_pixel: u8,
    colorspace: String,
    frames: Vec<FrameInfo>,
}

#[derive(Debug, Serialize)]
struct FrameInfo {
    index: u8,
    width: u16,
    height: u16,
    /// Intervals in 100 ns units; a `[min, max, step]` triple when
    /// `continuous` is set.
    intervals: Vec<u32>,
    continuous: bool,
    default_interval: u32,
}

fn colorspace_name(colorspace: Colorspace) -> &'static str {
    match colorspace {
        Colorspace::Srgb => "sRGB",
        Colorspace::Bt470M => "BT.470-2 (M)",
        Colorspace::Bt470Bg => "BT.470-2 (B, G)",
        Colorspace::Smpte170M => "SMPTE 170M",
        Colorspace::Smpte240M => "SMPTE 240M",
        Colorspace::Unspecified => "unspecified",
    }
}

/// Frames per second for a 100 ns interval, for display.
fn fps(interval: u32) -> f64 {
    let (num, den) = uvcgraph::interval::simplify_fraction(10_000_000, interval.max(1), 8, 333);
    f64::from(num) / f64::from(den.max(1))
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    let layout = dump::load(&args.dump)?;
    let device = Device::parse(&layout)?;

    let interfaces: Vec<InterfaceFormats> = device
        .streaming()
        .iter()
        .filter(|s| args.interface.map_or(true, |n| n == s.interface_number))
        .map(|s| InterfaceFormats {
            interface: s.interface_number,
            endpoint_address: s.endpoint_address,
            max_packet_size: s.max_packet_size,
            formats: s
                .formats
                .iter()
                .map(|f| FormatInfo {
                    index: f.index,
                    fourcc: f.fourcc.to_string(),
                    compressed: f.compressed,
                    bits_per_pixel: f.bits_per_pixel,
                    colorspace: colorspace_name(f.colorspace).to_string(),
                    frames: f
                        .frames
                        .iter()
                        .map(|frame| FrameInfo {
                            index: frame.index,
                            width: frame.width,
                            height: frame.height,
                            intervals: frame.intervals.clone(),
                            continuous: frame.continuous,
                            default_interval: frame.default_interval,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    if interfaces.is_empty() {
        return Err(CliError::InvalidArgs(match args.interface {
            Some(n) => format!("no streaming interface {}", n),
            None => "device has no streaming interfaces".to_string(),
        }));
    }

    if json {
        let out = serde_json::to_string_pretty(&interfaces)
            .map_err(|e| CliError::General(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    for interface in &interfaces {
        println!(
            "Interface {} (endpoint 0x{:02x}, max packet {} bytes)",
            interface.interface, interface.endpoint_address, interface.max_packet_size
        );
        for format in &interface.formats {
            println!(
                "  {} ({}, {})",
                format.fourcc,
                if format.compressed {
                    "compressed".to_string()
                } else {
                    format!("{} bpp", format.bits_per_pixel)
                },
                format.colorspace
            );
            for frame in &format.frames {
                let rates: Vec<String> = if frame.continuous {
                    vec![format!(
                        "{:.2}-{:.2} fps",
                        fps(frame.intervals[1]),
                        fps(frame.intervals[0])
                    )]
                } else {
                    frame
                        .intervals
                        .iter()
                        .map(|&i| format!("{:.2} fps", fps(i)))
                        .collect()
                };
                println!(
                    "    {:>4} x {:<4} [{}]",
                    frame.width,
                    frame.height,
                    rates.join(", ")
                );
            }
        }
    }
    Ok(())
}
