// SPDX-License-Identifier: Apache-2.0

//! Descriptor dump loading.
//!
//! A dump is a JSON snapshot of a device's descriptor regions, typically
//! produced by a capture script on the host that enumerated the device.
//! Byte regions are JSON arrays of numbers; string descriptors are keyed
//! by their index.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use uvcgraph::{AltSetting, DeviceLayout, Endpoint, InterfaceLayout};

use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct LayoutDump {
    #[serde(default)]
    vendor_id: u16,
    #[serde(default)]
    product_id: u16,
    control: InterfaceDump,
    #[serde(default)]
    streaming: Vec<InterfaceDump>,
    #[serde(default)]
    strings: BTreeMap<u8, String>,
}

#[derive(Debug, Deserialize)]
struct InterfaceDump {
    number: u8,
    #[serde(default)]
    alt_settings: Vec<AltSettingDump>,
}

#[derive(Debug, Deserialize)]
struct AltSettingDump {
    #[serde(default)]
    extra: Vec<u8>,
    #[serde(default)]
    endpoints: Vec<EndpointDump>,
}

#[derive(Debug, Deserialize)]
struct EndpointDump {
    address: u8,
    #[serde(default)]
    max_packet_size: u16,
    #[serde(default)]
    extra: Vec<u8>,
}

impl From<InterfaceDump> for InterfaceLayout {
    fn from(dump: InterfaceDump) -> Self {
        InterfaceLayout {
            number: dump.number,
            alt_settings: dump
                .alt_settings
                .into_iter()
                .map(|alt| AltSetting {
                    extra: alt.extra,
                    endpoints: alt
                        .endpoints
                        .into_iter()
                        .map(|ep| Endpoint {
                            address: ep.address,
                            max_packet_size: ep.max_packet_size,
                            extra: ep.extra,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Load a descriptor dump file into the parser's input model.
pub fn load(path: &Path) -> Result<DeviceLayout, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::DumpUnreadable(format!("{}: {}", path.display(), e)))?;
    let dump: LayoutDump = serde_json::from_str(&text)
        .map_err(|e| CliError::DumpUnreadable(format!("{}: {}", path.display(), e)))?;

    Ok(DeviceLayout {
        vendor_id: dump.vendor_id,
        product_id: dump.product_id,
        control: dump.control.into(),
        streaming: dump.streaming.into_iter().map(Into::into).collect(),
        strings: dump.strings,
    })
}
