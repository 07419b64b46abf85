// SPDX-License-Identifier: Apache-2.0
//
// End-to-end descriptor parsing tests
//
// These tests assemble complete synthetic enumeration snapshots the way a
// USB host stack would hand them over (raw class-specific byte regions per
// interface) and drive the full pipeline: control parse, streaming parse,
// chain resolution.
//
// The synthetic device in `webcam_layout` mirrors a typical laptop camera:
// camera terminal -> processing unit -> extension unit -> streaming output,
// one streaming interface with an uncompressed format and an MJPEG format.

use std::collections::BTreeMap;

use uvcgraph::fourcc::FourCC;
use uvcgraph::{AltSetting, Device, DeviceLayout, Endpoint, Error, InterfaceLayout};

const CS_INTERFACE: u8 = 0x24;

/// Route library log output through the test harness when debugging with
/// `RUST_LOG=debug cargo test -- --nocapture`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// YUY2 format GUID: the fourcc code followed by the standard UVC tail.
const YUY2_GUID: [u8; 16] = [
    b'Y', b'U', b'Y', b'2', 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b,
    0x71,
];

fn vc_header(clock: u32, interfaces: &[u8]) -> Vec<u8> {
    let mut rec = vec![(12 + interfaces.len()) as u8, CS_INTERFACE, 0x01];
    rec.extend_from_slice(&0x0110u16.to_le_bytes());
    rec.extend_from_slice(&clock.to_le_bytes());
    rec.extend_from_slice(&[0x00, 0x00]); // total length, unused
    rec.push(interfaces.len() as u8);
    rec.extend_from_slice(interfaces);
    rec
}

fn camera_terminal(id: u8, name_index: u8) -> Vec<u8> {
    vec![
        17,
        CS_INTERFACE,
        0x02, // input terminal
        id,
        0x01,
        0x02, // ITT_CAMERA
        0x00,
        name_index,
        0x00,
        0x00, // focal min
        0x00,
        0x00, // focal max
        0x00,
        0x00, // ocular
        2,    // control size
        0x3f,
        0x00,
    ]
}

fn processing_unit(id: u8, source: u8) -> Vec<u8> {
    vec![
        12,
        CS_INTERFACE,
        0x05,
        id,
        source,
        0x00,
        0x40, // multiplier 0x4000
        2,    // control size
        0xff,
        0x01,
        0x00, // video standards
        0x00, // name index
    ]
}

fn extension_unit(id: u8, source: u8) -> Vec<u8> {
    let mut rec = vec![0u8, CS_INTERFACE, 0x06, id];
    rec.extend_from_slice(&[0x42; 16]); // guid
    rec.push(3); // control count
    rec.extend_from_slice(&1u16.to_le_bytes()); // pin count
    rec.push(source);
    rec.push(1); // control size
    rec.push(0x07);
    rec.push(0); // name index
    rec[0] = rec.len() as u8;
    rec
}

fn output_terminal(id: u8, source: u8) -> Vec<u8> {
    vec![9, CS_INTERFACE, 0x03, id, 0x01, 0x01, 0x00, source, 0x00]
}

fn vs_input_header(formats: u8, terminal_link: u8) -> Vec<u8> {
    let mut rec = vec![
        (13 + formats as usize) as u8,
        CS_INTERFACE,
        0x01, // input header
        formats,
        0x00,
        0x00,
        0x81, // endpoint
        0x00, // info
        terminal_link,
        0x02, // still capture method
        0x01, // trigger support
        0x00, // trigger usage
        1,    // control width
    ];
    rec.extend(std::iter::repeat(0u8).take(formats as usize));
    rec
}

fn uncompressed_format(index: u8, frames: u8, guid: &[u8; 16], bpp: u8) -> Vec<u8> {
    let mut rec = vec![27, CS_INTERFACE, 0x04, index, frames];
    rec.extend_from_slice(guid);
    rec.push(bpp);
    rec.extend_from_slice(&[1, 0, 0, 0, 0]); // default frame, ratios, interlace, copy protect
    rec
}

fn mjpeg_format(index: u8, frames: u8) -> Vec<u8> {
    vec![11, CS_INTERFACE, 0x06, index, frames, 0x01, 1, 0, 0, 0, 0]
}

fn discrete_frame(subtype: u8, index: u8, width: u16, height: u16, intervals: &[u32]) -> Vec<u8> {
    let mut rec = vec![
        (26 + 4 * intervals.len()) as u8,
        CS_INTERFACE,
        subtype,
        index,
        0x03,
    ];
    rec.extend_from_slice(&width.to_le_bytes());
    rec.extend_from_slice(&height.to_le_bytes());
    rec.extend_from_slice(&1_000_000u32.to_le_bytes());
    rec.extend_from_slice(&100_000_000u32.to_le_bytes());
    rec.extend_from_slice(&(u32::from(width) * u32::from(height) * 2).to_le_bytes());
    rec.extend_from_slice(&intervals[0].to_le_bytes());
    rec.push(intervals.len() as u8);
    for &value in intervals {
        rec.extend_from_slice(&value.to_le_bytes());
    }
    rec
}

fn control_interface(region: Vec<u8>) -> InterfaceLayout {
    InterfaceLayout {
        number: 0,
        alt_settings: vec![AltSetting {
            extra: region,
            endpoints: Vec::new(),
        }],
    }
}

fn streaming_interface(number: u8, region: Vec<u8>) -> InterfaceLayout {
    InterfaceLayout {
        number,
        alt_settings: vec![
            AltSetting {
                extra: region,
                endpoints: Vec::new(),
            },
            AltSetting {
                extra: Vec::new(),
                endpoints: vec![Endpoint {
                    address: 0x81,
                    max_packet_size: 0x1400, // 1024 bytes, 2 extra transactions
                    extra: Vec::new(),
                }],
            },
        ],
    }
}

fn webcam_layout() -> DeviceLayout {
    let mut vc = vc_header(48_000_000, &[1]);
    vc.extend(camera_terminal(1, 2));
    vc.extend(processing_unit(2, 1));
    vc.extend(extension_unit(3, 2));
    vc.extend(output_terminal(4, 3));

    let mut vs = vs_input_header(2, 4);
    vs.extend(uncompressed_format(1, 2, &YUY2_GUID, 16));
    vs.extend(discrete_frame(0x05, 1, 640, 480, &[333333, 666666]));
    vs.extend(discrete_frame(0x05, 2, 1280, 720, &[666666]));
    vs.extend(mjpeg_format(2, 1));
    vs.extend(discrete_frame(0x07, 1, 1920, 1080, &[333333]));

    let mut strings = BTreeMap::new();
    strings.insert(2u8, "Integrated Camera".to_string());

    DeviceLayout {
        vendor_id: 0x04f2,
        product_id: 0xb604,
        control: control_interface(vc),
        streaming: vec![streaming_interface(1, vs)],
        strings,
    }
}

#[test]
fn test_parse_typical_webcam() {
    init_logging();
    let device = Device::parse(&webcam_layout()).unwrap();

    assert_eq!(device.uvc_version(), 0x0110);
    assert_eq!(device.clock_frequency(), 48_000_000);
    assert_eq!(device.vendor_id(), 0x04f2);
    assert_eq!(device.entities().len(), 4);
    assert_eq!(device.entities()[0].name, "Integrated Camera");
    assert_eq!(device.entities()[1].name, "Processing 2");

    assert_eq!(device.streaming().len(), 1);
    let stream = &device.streaming()[0];
    assert_eq!(stream.terminal_link, 4);
    assert_eq!(stream.max_packet_size, 3072);

    assert_eq!(stream.formats.len(), 2);
    let yuy2 = &stream.formats[0];
    assert_eq!(yuy2.fourcc, FourCC(*b"YUY2"));
    assert_eq!(yuy2.bits_per_pixel, 16);
    assert!(!yuy2.compressed);
    assert_eq!(yuy2.frames.len(), 2);
    assert_eq!(yuy2.frames[1].width, 1280);
    assert_eq!(yuy2.frames[1].height, 720);

    let mjpg = &stream.formats[1];
    assert_eq!(mjpg.fourcc, FourCC(*b"MJPG"));
    assert!(mjpg.compressed);
    assert_eq!(mjpg.frames[0].width, 1920);
}

#[test]
fn test_resolve_webcam_chain() {
    let device = Device::parse(&webcam_layout()).unwrap();
    let chain = device.scan_chain().unwrap();

    assert_eq!(chain.input_terminals.len(), 1);
    assert_eq!(chain.input_terminals[0].id, 1);
    assert_eq!(chain.processing_unit.unwrap().id, 2);
    assert_eq!(chain.extension_units.len(), 1);
    assert_eq!(chain.extension_units[0].id, 3);
    assert!(chain.selector_unit.is_none());
    assert_eq!(chain.output_terminal.id, 4);
    assert_eq!(chain.streaming.interface_number, 1);
    assert_eq!(chain.to_string(), "IT 1 -> PU 2 -> XU 3 -> OT 4");
}

#[test]
fn test_truncated_control_region_fails_device() {
    let mut layout = webcam_layout();
    // Chop the control region mid-record.
    if let Some(alt) = layout.control.alt_settings.first_mut() {
        let len = alt.extra.len();
        alt.extra.truncate(len - 3);
    }
    assert_eq!(
        Device::parse(&layout).unwrap_err(),
        Error::TruncatedDescriptor
    );
}

#[test]
fn test_bad_streaming_interface_skips_sibling_survives() {
    // Two streaming interfaces; the first one's region is garbage.
    let mut vc = vc_header(48_000_000, &[1, 2]);
    vc.extend(camera_terminal(1, 0));
    vc.extend(output_terminal(4, 1));

    let mut good_vs = vs_input_header(1, 4);
    good_vs.extend(mjpeg_format(1, 1));
    good_vs.extend(discrete_frame(0x07, 1, 640, 480, &[333333]));

    let layout = DeviceLayout {
        control: control_interface(vc),
        streaming: vec![
            streaming_interface(1, vec![0x05, CS_INTERFACE, 0x01, 0x00, 0x00]),
            streaming_interface(2, good_vs),
        ],
        ..DeviceLayout::default()
    };

    let device = Device::parse(&layout).unwrap();
    assert_eq!(device.streaming().len(), 1);
    assert_eq!(device.streaming()[0].interface_number, 2);
}

#[test]
fn test_duplicate_interface_claim_ignored() {
    let mut vc = vc_header(48_000_000, &[1, 1]);
    vc.extend(camera_terminal(1, 0));
    vc.extend(output_terminal(4, 1));

    let mut vs = vs_input_header(1, 4);
    vs.extend(mjpeg_format(1, 1));
    vs.extend(discrete_frame(0x07, 1, 640, 480, &[333333]));

    let layout = DeviceLayout {
        control: control_interface(vc),
        streaming: vec![streaming_interface(1, vs)],
        ..DeviceLayout::default()
    };

    let device = Device::parse(&layout).unwrap();
    assert_eq!(device.streaming().len(), 1);
}

#[test]
fn test_unknown_claimed_interface_ignored() {
    let mut vc = vc_header(48_000_000, &[1, 7]);
    vc.extend(camera_terminal(1, 0));
    vc.extend(output_terminal(4, 1));

    let mut vs = vs_input_header(1, 4);
    vs.extend(mjpeg_format(1, 1));
    vs.extend(discrete_frame(0x07, 1, 640, 480, &[333333]));

    let layout = DeviceLayout {
        control: control_interface(vc),
        streaming: vec![streaming_interface(1, vs)],
        ..DeviceLayout::default()
    };

    let device = Device::parse(&layout).unwrap();
    assert_eq!(device.streaming().len(), 1);
}

#[test]
fn test_no_chain_without_streaming_interfaces() {
    let mut vc = vc_header(48_000_000, &[]);
    vc.extend(camera_terminal(1, 0));
    vc.extend(output_terminal(4, 1));

    let layout = DeviceLayout {
        control: control_interface(vc),
        ..DeviceLayout::default()
    };

    let device = Device::parse(&layout).unwrap();
    assert_eq!(device.scan_chain().unwrap_err(), Error::NoValidChain);
}

#[test]
fn test_logitech_quirk_end_to_end() {
    let mut vc = vc_header(48_000_000, &[1]);
    vc.extend(camera_terminal(1, 0));
    // Logitech vendor unit between camera and output.
    let mut lxu = vec![0u8, 0x41, 0x01, 3];
    lxu.extend_from_slice(&[0x11; 16]);
    lxu.push(2); // control count
    lxu.extend_from_slice(&1u16.to_le_bytes());
    lxu.push(1); // source
    lxu.push(1); // control size
    lxu.push(0x03); // controls
    lxu.push(0x01); // control types
    lxu.push(0); // reserved
    lxu.push(0); // name index
    lxu[0] = lxu.len() as u8;
    vc.extend(lxu);
    vc.extend(output_terminal(4, 3));

    let mut vs = vs_input_header(1, 4);
    vs.extend(mjpeg_format(1, 1));
    vs.extend(discrete_frame(0x07, 1, 640, 480, &[333333]));

    let layout = DeviceLayout {
        vendor_id: 0x046d,
        product_id: 0x082d,
        control: control_interface(vc),
        streaming: vec![streaming_interface(1, vs)],
        ..DeviceLayout::default()
    };

    let device = Device::parse(&layout).unwrap();
    assert_eq!(device.entities().len(), 3);

    let chain = device.scan_chain().unwrap();
    assert_eq!(chain.extension_units.len(), 1);
    assert_eq!(chain.extension_units[0].id, 3);
    assert_eq!(chain.extension_units[0].name, "Extension 3");
}
