// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Args as ClapArgs;
use serde::Serialize;
use uvcgraph::{Device, Entity};

use crate::dump;
use crate::error::CliError;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Descriptor dump file (JSON)
    dump: PathBuf,
}

#[derive(Debug, Serialize)]
struct ChainInfo {
    input_terminals: Vec<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector_unit: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_unit: Option<EntityRef>,
    extension_units: Vec<EntityRef>,
    output_terminal: EntityRef,
    streaming_interface: u8,
    endpoint_address: u8,
    max_packet_size: u32,
}

#[derive(Debug, Serialize)]
struct EntityRef {
    id: u8,
    name: String,
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        EntityRef {
            id: entity.id,
            name: entity.name.clone(),
        }
    }
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    let layout = dump::load(&args.dump)?;
    let device = Device::parse(&layout)?;
    let chain = device.scan_chain()?;

    if json {
        let info = ChainInfo {
            input_terminals: chain.input_terminals.iter().copied().map(Into::into).collect(),
            selector_unit: chain.selector_unit.map(Into::into),
            processing_unit: chain.processing_unit.map(Into::into),
            extension_units: chain.extension_units.iter().copied().map(Into::into).collect(),
            output_terminal: chain.output_terminal.into(),
            streaming_interface: chain.streaming.interface_number,
            endpoint_address: chain.streaming.endpoint_address,
            max_packet_size: chain.streaming.max_packet_size,
        };
        let out = serde_json::to_string_pretty(&info)
            .map_err(|e| CliError::General(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", chain);
    for terminal in &chain.input_terminals {
        println!("  input:      [{}] {}", terminal.id, terminal.name);
    }
    if let Some(selector) = chain.selector_unit {
        println!("  selector:   [{}] {}", selector.id, selector.name);
    }
    if let Some(unit) = chain.processing_unit {
        println!("  processing: [{}] {}", unit.id, unit.name);
    }
    for unit in &chain.extension_units {
        println!("  extension:  [{}] {}", unit.id, unit.name);
    }
    println!(
        "  output:     [{}] {}",
        chain.output_terminal.id, chain.output_terminal.name
    );
    println!(
        "  stream:     interface {}, endpoint 0x{:02x}, max packet {} bytes",
        chain.streaming.interface_number,
        chain.streaming.endpoint_address,
        chain.streaming.max_packet_size
    );
    Ok(())
}
