// SPDX-License-Identifier: Apache-2.0

//! Video Control descriptor parsing.
//!
//! Walks the control interface's class-specific region and builds the
//! device-wide entity collection. The header record also names the Video
//! Streaming interfaces belonging to this function; claiming and parsing
//! those is the device module's job.
//!
//! A record that is present but too short to safely read its declared
//! lengths fails the whole control parse: a device whose control topology
//! cannot be trusted cannot be used at all. Unknown record subtypes and
//! terminals with malformed type codes are logged and skipped.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::descriptor::{terminal, vc, DescriptorReader, Record, CS_INTERFACE};
use crate::entity::{
    CameraTerminal, Entity, EntityKind, ExtensionUnit, InputTerminal, InputTerminalKind,
    MediaTransportTerminal, OutputTerminal, ProcessingUnit, SelectorUnit,
};
use crate::Error;

/// Logitech vendor id; the one vendor with a recognized proprietary
/// control-descriptor layout.
const VENDOR_LOGITECH: u16 = 0x046d;

/// Descriptor type Logitech uses for its vendor extension unit records.
const LXU_DESCRIPTOR_TYPE: u8 = 0x41;
const LXU_SUBTYPE: u8 = 0x01;

/// Parsed Video Control interface: protocol header fields plus the entity
/// collection, in descriptor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInterface {
    /// UVC protocol release in BCD (0x0110 for UVC 1.1).
    pub uvc_version: u16,
    /// Device clock frequency in Hz.
    pub clock_frequency: u32,
    /// Video Streaming interface numbers associated with this function.
    pub streaming_interfaces: Vec<u8>,
    pub entities: Vec<Entity>,
}

/// Parse the Video Control interface's descriptor region.
pub fn parse_control(
    region: &[u8],
    vendor_id: u16,
    strings: &BTreeMap<u8, String>,
) -> Result<ControlInterface, Error> {
    let mut reader = DescriptorReader::new(region);
    let mut control: Option<ControlInterface> = None;
    let mut entities: Vec<Entity> = Vec::new();

    while let Some(record) = reader.next_record()? {
        // Vendor layouts come first; a handled record short-circuits
        // generic dispatch.
        if let Some(unit) = parse_vendor_control(&record, vendor_id, strings) {
            entities.push(unit);
            continue;
        }

        if record.descriptor_type() != CS_INTERFACE {
            continue;
        }

        match record.subtype() {
            vc::HEADER => {
                control = Some(parse_header(&record)?);
            }
            vc::INPUT_TERMINAL => {
                if let Some(term) = parse_input_terminal(&record, strings)? {
                    entities.push(term);
                }
            }
            vc::OUTPUT_TERMINAL => {
                if let Some(term) = parse_output_terminal(&record, strings)? {
                    entities.push(term);
                }
            }
            vc::SELECTOR_UNIT => entities.push(parse_selector_unit(&record, strings)?),
            vc::PROCESSING_UNIT => entities.push(parse_processing_unit(&record, strings)?),
            vc::EXTENSION_UNIT => entities.push(parse_extension_unit(&record, strings)?),
            other => {
                debug!("skipping unknown VC descriptor subtype {}", other);
            }
        }
    }

    let mut control = control.ok_or_else(|| {
        warn!("video control interface has no header descriptor");
        Error::TruncatedDescriptor
    })?;
    control.entities = entities;
    Ok(control)
}

fn parse_header(record: &Record) -> Result<ControlInterface, Error> {
    let uvc_version = record.u16_at(3)?;
    let clock_frequency = record.u32_at(5)?;
    let count = record.u8_at(11)? as usize;
    let streaming_interfaces = record.slice(12, count)?.to_vec();

    debug!(
        "UVC {}.{:02x} device, clock {} Hz, {} streaming interface(s)",
        uvc_version >> 8,
        uvc_version & 0xff,
        clock_frequency,
        streaming_interfaces.len()
    );

    Ok(ControlInterface {
        uvc_version,
        clock_frequency,
        streaming_interfaces,
        entities: Vec::new(),
    })
}

/// Resolve a string descriptor index, falling back to a generated default.
fn entity_name(
    strings: &BTreeMap<u8, String>,
    index: u8,
    kind: &str,
    id: u8,
) -> String {
    if index != 0 {
        if let Some(name) = strings.get(&index) {
            return name.clone();
        }
    }
    format!("{} {}", kind, id)
}

fn parse_input_terminal(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Option<Entity>, Error> {
    let id = record.u8_at(3)?;
    let terminal_type = record.u16_at(4)?;

    // A null type MSB would make the terminal indistinguishable from a
    // unit; skip rather than trust it.
    if terminal_type & 0xff00 == 0 {
        warn!(
            "input terminal {} has invalid type 0x{:04x}, skipping",
            id, terminal_type
        );
        return Ok(None);
    }

    let name_index = record.u8_at(7)?;

    let (payload, kind) = match terminal_type {
        terminal::ITT_CAMERA => {
            let n = record.u8_at(14)? as usize;
            let camera = CameraTerminal {
                focal_length_min: record.u16_at(8)?,
                focal_length_max: record.u16_at(10)?,
                ocular_focal_length: record.u16_at(12)?,
                controls: record.slice(15, n)?.to_vec(),
            };
            (InputTerminalKind::Camera(camera), "Camera")
        }
        terminal::ITT_MEDIA_TRANSPORT_INPUT => {
            let n = record.u8_at(8)? as usize;
            let controls = record.slice(9, n)?.to_vec();
            let p = record.u8_at(9 + n)? as usize;
            let transport_modes = record.slice(10 + n, p)?.to_vec();
            (
                InputTerminalKind::MediaTransport(MediaTransportTerminal {
                    controls,
                    transport_modes,
                }),
                "Media",
            )
        }
        _ => (InputTerminalKind::Vendor, "Input"),
    };

    Ok(Some(Entity {
        id,
        name: entity_name(strings, name_index, kind, id),
        kind: EntityKind::InputTerminal(InputTerminal {
            terminal_type,
            payload,
        }),
    }))
}

fn parse_output_terminal(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Option<Entity>, Error> {
    let id = record.u8_at(3)?;
    let terminal_type = record.u16_at(4)?;

    if terminal_type & 0xff00 == 0 {
        warn!(
            "output terminal {} has invalid type 0x{:04x}, skipping",
            id, terminal_type
        );
        return Ok(None);
    }

    let source_id = record.u8_at(7)?;
    let name_index = record.u8_at(8)?;

    Ok(Some(Entity {
        id,
        name: entity_name(strings, name_index, "Output", id),
        kind: EntityKind::OutputTerminal(OutputTerminal {
            terminal_type,
            source_id,
        }),
    }))
}

fn parse_selector_unit(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Entity, Error> {
    let id = record.u8_at(3)?;
    let p = record.u8_at(4)? as usize;
    let sources = record.slice(5, p)?.to_vec();
    let name_index = record.u8_at(5 + p)?;

    Ok(Entity {
        id,
        name: entity_name(strings, name_index, "Selector", id),
        kind: EntityKind::SelectorUnit(SelectorUnit { sources }),
    })
}

fn parse_processing_unit(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Entity, Error> {
    let id = record.u8_at(3)?;
    let source_id = record.u8_at(4)?;
    let max_multiplier = record.u16_at(5)?;
    let n = record.u8_at(7)? as usize;
    let controls = record.slice(8, n)?.to_vec();
    let video_standards = record.u8_at(8 + n)?;
    let name_index = record.u8_at(9 + n)?;

    Ok(Entity {
        id,
        name: entity_name(strings, name_index, "Processing", id),
        kind: EntityKind::ProcessingUnit(ProcessingUnit {
            source_id,
            max_multiplier,
            controls,
            video_standards,
        }),
    })
}

fn parse_extension_unit(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Entity, Error> {
    let id = record.u8_at(3)?;
    let mut guid = [0u8; 16];
    guid.copy_from_slice(record.slice(4, 16)?);
    let num_controls = record.u8_at(20)?;
    let p = record.u16_at(21)? as usize;
    let sources = record.slice(23, p)?.to_vec();
    let n = record.u8_at(23 + p)? as usize;
    let controls = record.slice(24 + p, n)?.to_vec();
    let name_index = record.u8_at(24 + p + n)?;

    Ok(Entity {
        id,
        name: entity_name(strings, name_index, "Extension", id),
        kind: EntityKind::ExtensionUnit(ExtensionUnit {
            guid,
            num_controls,
            sources,
            controls,
            control_types: None,
        }),
    })
}

/// Recognize proprietary control-descriptor layouts and synthesize the
/// corresponding entity.
///
/// Logitech implements vendor functions through extension units whose
/// descriptors (LXU) follow the standard XU layout but append a second
/// bitmap marking each control as absolute or relative. A malformed vendor
/// record is logged and left to generic dispatch, which skips it; not
/// matching is not an error.
fn parse_vendor_control(
    record: &Record,
    vendor_id: u16,
    strings: &BTreeMap<u8, String>,
) -> Option<Entity> {
    if vendor_id != VENDOR_LOGITECH
        || record.descriptor_type() != LXU_DESCRIPTOR_TYPE
        || record.subtype() != LXU_SUBTYPE
    {
        return None;
    }

    match parse_logitech_unit(record, strings) {
        Ok(unit) => Some(unit),
        Err(_) => {
            warn!("truncated Logitech extension unit descriptor, skipping");
            None
        }
    }
}

fn parse_logitech_unit(
    record: &Record,
    strings: &BTreeMap<u8, String>,
) -> Result<Entity, Error> {
    let id = record.u8_at(3)?;
    let mut guid = [0u8; 16];
    guid.copy_from_slice(record.slice(4, 16)?);
    let num_controls = record.u8_at(20)?;
    let p = record.u16_at(21)? as usize;
    let sources = record.slice(23, p)?.to_vec();
    let n = record.u8_at(23 + p)? as usize;
    let controls = record.slice(24 + p, n)?.to_vec();
    let control_types = record.slice(24 + p + n, n)?.to_vec();
    // One reserved byte between the bitmaps and the string index.
    let name_index = record.u8_at(25 + p + 2 * n)?;

    debug!("synthesized Logitech extension unit {}", id);

    Ok(Entity {
        id,
        name: entity_name(strings, name_index, "Extension", id),
        kind: EntityKind::ExtensionUnit(ExtensionUnit {
            guid,
            num_controls,
            sources,
            controls,
            control_types: Some(control_types),
        }),
    })
}
