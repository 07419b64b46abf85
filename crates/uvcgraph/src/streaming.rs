// SPDX-License-Identifier: Apache-2.0

//! Video Streaming descriptor parsing.
//!
//! Builds the format and frame tables for one streaming interface from its
//! class-specific descriptor region. Failures here are fatal for the
//! interface only; the device module logs and moves on to its siblings.

use log::{debug, warn};

use crate::descriptor::{vs, DescriptorReader, Record, CS_INTERFACE};
use crate::device::InterfaceLayout;
use crate::fourcc::FourCC;
use crate::Error;

/// Color primaries from the color-matching descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colorspace {
    #[default]
    Unspecified,
    Srgb,
    Bt470M,
    Bt470Bg,
    Smpte170M,
    Smpte240M,
}

impl From<u8> for Colorspace {
    fn from(primaries: u8) -> Self {
        match primaries {
            1 => Colorspace::Srgb,
            2 => Colorspace::Bt470M,
            3 => Colorspace::Bt470Bg,
            4 => Colorspace::Smpte170M,
            5 => Colorspace::Smpte240M,
            _ => Colorspace::Unspecified,
        }
    }
}

/// One frame size of a format with the intervals it can be captured at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: u8,
    pub capabilities: u8,
    pub width: u16,
    pub height: u16,
    pub min_bit_rate: u32,
    pub max_bit_rate: u32,
    pub max_buffer_size: u32,
    /// Discrete interval list, or the `[min, max, step]` triple of a
    /// continuous range, in 100 ns units. Never empty, never zero.
    pub intervals: Vec<u32>,
    /// True when `intervals` is a continuous `[min, max, step]` triple.
    pub continuous: bool,
    pub default_interval: u32,
}

/// One negotiable pixel format with its frame table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub index: u8,
    pub fourcc: FourCC,
    pub compressed: bool,
    /// Bits per pixel; 0 for compressed formats.
    pub bits_per_pixel: u8,
    pub colorspace: Colorspace,
    pub frames: Vec<Frame>,
}

/// A parsed Video Streaming interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingInterface {
    pub interface_number: u8,
    pub endpoint_address: u8,
    pub info: u8,
    /// Id of the output terminal this interface streams from.
    pub terminal_link: u8,
    pub still_capture_method: u8,
    pub trigger_support: u8,
    pub trigger_usage: u8,
    /// One control bitmap row per format, in format order.
    pub format_controls: Vec<Vec<u8>>,
    pub formats: Vec<Format>,
    /// Largest per-transfer payload any alternate setting offers on the
    /// streaming endpoint, in bytes.
    pub max_packet_size: u32,
}

/// Parse one streaming interface's descriptors into its format tables.
pub fn parse_streaming(interface: &InterfaceLayout) -> Result<StreamingInterface, Error> {
    let region = descriptor_region(interface);
    if region.is_empty() {
        warn!(
            "interface {} has no class-specific descriptors",
            interface.number
        );
        return Err(Error::TruncatedDescriptor);
    }

    let mut reader = DescriptorReader::new(region);
    let header = match reader.next_class_specific()? {
        Some(record) if record.subtype() == vs::INPUT_HEADER => record,
        Some(record) if record.subtype() == vs::OUTPUT_HEADER => {
            debug!("interface {} is an output stream", interface.number);
            return Err(Error::UnsupportedFormat);
        }
        _ => {
            warn!(
                "interface {} descriptors do not start with a header",
                interface.number
            );
            return Err(Error::TruncatedDescriptor);
        }
    };

    let declared_formats = header.u8_at(3)? as usize;
    let endpoint_address = header.u8_at(6)?;
    let info = header.u8_at(7)?;
    let terminal_link = header.u8_at(8)?;
    let still_capture_method = header.u8_at(9)?;
    let trigger_support = header.u8_at(10)?;
    let trigger_usage = header.u8_at(11)?;
    let control_width = header.u8_at(12)? as usize;
    let rows = header.slice(13, declared_formats * control_width)?;
    let format_controls: Vec<Vec<u8>> = rows
        .chunks(control_width.max(1))
        .map(<[u8]>::to_vec)
        .collect();

    let mut formats: Vec<Format> = Vec::with_capacity(declared_formats);
    // Frame subtype the current format expects; None while inside an
    // unsupported format's records.
    let mut frame_subtype: Option<u8> = None;

    while let Some(record) = reader.next_class_specific()? {
        match record.subtype() {
            vs::FORMAT_UNCOMPRESSED => {
                formats.push(parse_format_uncompressed(&record)?);
                frame_subtype = Some(vs::FRAME_UNCOMPRESSED);
            }
            vs::FORMAT_MJPEG => {
                formats.push(parse_format_mjpeg(&record)?);
                frame_subtype = Some(vs::FRAME_MJPEG);
            }
            vs::FORMAT_MPEG2TS | vs::FORMAT_DV | vs::FORMAT_FRAME_BASED
            | vs::FORMAT_STREAM_BASED => {
                warn!(
                    "interface {}: unsupported format subtype {}, skipping",
                    interface.number,
                    record.subtype()
                );
                frame_subtype = None;
            }
            subtype if Some(subtype) == frame_subtype => {
                // frame_subtype is only set right after a format push.
                let format = formats.last_mut().ok_or(Error::TruncatedDescriptor)?;
                format.frames.push(parse_frame(&record)?);
            }
            vs::FRAME_UNCOMPRESSED | vs::FRAME_MJPEG => {
                debug!("frame record outside a matching format, skipping");
            }
            vs::STILL_IMAGE_FRAME => {}
            vs::COLORFORMAT => {
                let primaries = record.u8_at(3)?;
                if let Some(format) = formats.last_mut() {
                    format.colorspace = Colorspace::from(primaries);
                }
            }
            other => {
                debug!("skipping unknown VS descriptor subtype {}", other);
            }
        }
    }

    if formats.is_empty() {
        warn!("interface {} has no usable format", interface.number);
        return Err(Error::UnsupportedFormat);
    }

    Ok(StreamingInterface {
        interface_number: interface.number,
        endpoint_address,
        info,
        terminal_link,
        still_capture_method,
        trigger_support,
        trigger_usage,
        format_controls,
        formats,
        max_packet_size: max_packet_size(interface, endpoint_address),
    })
}

/// Locate the class-specific descriptor region for an interface.
///
/// Normally alternate setting 0's extra bytes. Some devices (Pico iMage
/// among them) attach the streaming descriptors to an endpoint instead;
/// fall back to the first endpoint whose extra bytes open with a
/// class-specific record.
fn descriptor_region(interface: &InterfaceLayout) -> &[u8] {
    if let Some(alt) = interface.alt_settings.first() {
        if !alt.extra.is_empty() {
            return &alt.extra;
        }
        for endpoint in &alt.endpoints {
            if endpoint.extra.len() > 2 && endpoint.extra[1] == CS_INTERFACE {
                debug!(
                    "interface {}: using endpoint-attached descriptors",
                    interface.number
                );
                return &endpoint.extra;
            }
        }
    }
    &[]
}

fn parse_format_uncompressed(record: &Record) -> Result<Format, Error> {
    let index = record.u8_at(3)?;
    let mut guid = [0u8; 16];
    guid.copy_from_slice(record.slice(5, 16)?);
    let bits_per_pixel = record.u8_at(21)?;

    let fourcc = FourCC::from_guid(&guid).unwrap_or_else(|| {
        debug!("unrecognized format GUID, using embedded code");
        FourCC([guid[0], guid[1], guid[2], guid[3]])
    });

    Ok(Format {
        index,
        fourcc,
        compressed: false,
        bits_per_pixel,
        colorspace: Colorspace::Unspecified,
        frames: Vec::new(),
    })
}

fn parse_format_mjpeg(record: &Record) -> Result<Format, Error> {
    let index = record.u8_at(3)?;
    // Fixed fields through bCopyProtect.
    record.u8_at(10)?;

    Ok(Format {
        index,
        fourcc: FourCC::MJPG,
        compressed: true,
        bits_per_pixel: 0,
        colorspace: Colorspace::Unspecified,
        frames: Vec::new(),
    })
}

fn parse_frame(record: &Record) -> Result<Frame, Error> {
    let index = record.u8_at(3)?;
    let capabilities = record.u8_at(4)?;
    let width = record.u16_at(5)?;
    let height = record.u16_at(7)?;
    let min_bit_rate = record.u32_at(9)?;
    let max_bit_rate = record.u32_at(13)?;
    let max_buffer_size = record.u32_at(17)?;
    let declared_default = record.u32_at(21)?;
    let interval_type = record.u8_at(25)?;

    // Type 0 declares a continuous range as a min/max/step triple.
    let continuous = interval_type == 0;
    let count = if continuous { 3 } else { interval_type as usize };

    let mut intervals = Vec::with_capacity(count);
    for i in 0..count {
        let value = record.u32_at(26 + 4 * i)?;
        // Some devices report zero intervals; make them usable.
        intervals.push(value.max(1));
    }

    // For a continuous range the clamp ceiling is the declared maximum,
    // not the step field.
    let ceiling = if continuous {
        intervals[1]
    } else {
        intervals[count - 1]
    };
    let default_interval = declared_default.max(intervals[0]).min(ceiling.max(intervals[0]));

    Ok(Frame {
        index,
        capabilities,
        width,
        height,
        min_bit_rate,
        max_bit_rate,
        max_buffer_size,
        intervals,
        continuous,
        default_interval,
    })
}

/// Largest usable payload per transfer across all alternate settings of
/// the interface for the given endpoint.
///
/// High-speed endpoints encode extra transactions per microframe in bits
/// 11..13 of the max packet size field.
fn max_packet_size(interface: &InterfaceLayout, endpoint_address: u8) -> u32 {
    let mut best = 0u32;
    for alt in &interface.alt_settings {
        for endpoint in &alt.endpoints {
            if endpoint.address != endpoint_address {
                continue;
            }
            let w = endpoint.max_packet_size;
            let size = u32::from(w & 0x7ff) * (1 + u32::from((w >> 11) & 3));
            best = best.max(size);
        }
    }
    best
}
