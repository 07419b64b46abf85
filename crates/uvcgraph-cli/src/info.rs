// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Args as ClapArgs;
use serde::Serialize;
use uvcgraph::Device;

use crate::dump;
use crate::error::CliError;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Descriptor dump file (JSON)
    dump: PathBuf,
}

#[derive(Debug, Serialize)]
struct DeviceInfo {
    vendor_id: String,
    product_id: String,
    uvc_version: String,
    clock_frequency_hz: u32,
    entities: Vec<EntityInfo>,
    streaming_interfaces: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct EntityInfo {
    id: u8,
    kind: &'static str,
    name: String,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    let layout = dump::load(&args.dump)?;
    let device = Device::parse(&layout)?;

    let info = DeviceInfo {
        vendor_id: format!("{:04x}", device.vendor_id()),
        product_id: format!("{:04x}", device.product_id()),
        uvc_version: format!(
            "{}.{:02x}",
            device.uvc_version() >> 8,
            device.uvc_version() & 0xff
        ),
        clock_frequency_hz: device.clock_frequency(),
        entities: device
            .entities()
            .iter()
            .map(|e| EntityInfo {
                id: e.id,
                kind: e.tag(),
                name: e.name.clone(),
            })
            .collect(),
        streaming_interfaces: device
            .streaming()
            .iter()
            .map(|s| s.interface_number)
            .collect(),
    };

    if json {
        let out = serde_json::to_string_pretty(&info)
            .map_err(|e| CliError::General(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "UVC {} device {}:{}",
        info.uvc_version, info.vendor_id, info.product_id
    );
    println!("Clock: {} Hz", info.clock_frequency_hz);
    println!("Entities:");
    for entity in &info.entities {
        println!("  [{}] {:2}  {}", entity.kind, entity.id, entity.name);
    }
    if info.streaming_interfaces.is_empty() {
        println!("No usable streaming interfaces");
    } else {
        println!("Streaming interfaces: {:?}", info.streaming_interfaces);
    }
    Ok(())
}
