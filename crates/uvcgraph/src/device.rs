// SPDX-License-Identifier: Apache-2.0

//! Device-level parsing entry point.
//!
//! [`DeviceLayout`] is the enumeration snapshot the embedding application
//! provides; [`Device`] is the parsed result tying together the entity
//! graph and the streaming interface tables.

use std::collections::BTreeMap;

use log::warn;

use crate::chain::{scan_chain, VideoChain};
use crate::control::parse_control;
use crate::entity::Entity;
use crate::streaming::{parse_streaming, StreamingInterface};
use crate::Error;

/// Raw descriptor snapshot of one UVC function, captured at enumeration
/// time.
#[derive(Debug, Clone, Default)]
pub struct DeviceLayout {
    pub vendor_id: u16,
    pub product_id: u16,
    /// The Video Control interface.
    pub control: InterfaceLayout,
    /// The Video Streaming interfaces, in enumeration order.
    pub streaming: Vec<InterfaceLayout>,
    /// String descriptors by index.
    pub strings: BTreeMap<u8, String>,
}

/// One interface with its alternate settings.
#[derive(Debug, Clone, Default)]
pub struct InterfaceLayout {
    pub number: u8,
    pub alt_settings: Vec<AltSetting>,
}

/// One alternate setting: its class-specific extra bytes and endpoints.
#[derive(Debug, Clone, Default)]
pub struct AltSetting {
    pub extra: Vec<u8>,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Default)]
pub struct Endpoint {
    pub address: u8,
    /// Raw wMaxPacketSize field, transaction bits included.
    pub max_packet_size: u16,
    pub extra: Vec<u8>,
}

/// A parsed UVC device. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Device {
    vendor_id: u16,
    product_id: u16,
    uvc_version: u16,
    clock_frequency: u32,
    entities: Vec<Entity>,
    streaming: Vec<StreamingInterface>,
}

impl Device {
    /// Parse an enumeration snapshot.
    ///
    /// The control interface must parse cleanly; a streaming interface
    /// that fails to parse is logged and dropped so its siblings remain
    /// usable.
    pub fn parse(layout: &DeviceLayout) -> Result<Device, Error> {
        let control_region = layout
            .control
            .alt_settings
            .first()
            .map(|alt| alt.extra.as_slice())
            .unwrap_or_default();
        let control = parse_control(control_region, layout.vendor_id, &layout.strings)?;

        let mut streaming = Vec::new();
        let mut claimed: Vec<u8> = Vec::new();
        for &number in &control.streaming_interfaces {
            if claimed.contains(&number) {
                warn!("interface {} listed twice in the control header", number);
                continue;
            }
            let Some(interface) = layout.streaming.iter().find(|i| i.number == number) else {
                warn!("control header names unknown interface {}", number);
                continue;
            };
            claimed.push(number);

            match parse_streaming(interface) {
                Ok(stream) => streaming.push(stream),
                Err(err) => {
                    warn!("skipping streaming interface {}: {}", number, err);
                }
            }
        }

        Ok(Device {
            vendor_id: layout.vendor_id,
            product_id: layout.product_id,
            uvc_version: control.uvc_version,
            clock_frequency: control.clock_frequency,
            entities: control.entities,
            streaming,
        })
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// UVC protocol release in BCD (0x0110 for UVC 1.1).
    pub fn uvc_version(&self) -> u16 {
        self.uvc_version
    }

    /// Device clock frequency in Hz.
    pub fn clock_frequency(&self) -> u32 {
        self.clock_frequency
    }

    /// All terminals and units, in descriptor order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Successfully parsed streaming interfaces.
    pub fn streaming(&self) -> &[StreamingInterface] {
        &self.streaming
    }

    /// Resolve the device's video chain.
    pub fn scan_chain(&self) -> Result<VideoChain<'_>, Error> {
        scan_chain(&self.entities, &self.streaming)
    }
}
