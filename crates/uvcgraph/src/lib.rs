// SPDX-License-Identifier: Apache-2.0

//! UVC descriptor parsing and video-chain resolution
//!
//! `uvcgraph` interprets the class-specific binary descriptors a USB Video
//! Class (UVC) device emits during enumeration and reconstructs the device's
//! internal video-processing topology: terminals and units connected by
//! source references, plus the catalog of pixel formats, frame sizes and
//! frame intervals each streaming interface can produce. From the entity
//! graph it resolves the single video chain that connects an input terminal
//! through optional processing, selector and extension units to the
//! streaming output terminal exposed to applications.
//!
//! The library performs no USB I/O. The embedding application captures an
//! enumeration snapshot ([`DeviceLayout`]) holding the raw descriptor byte
//! regions, alternate settings and string descriptors, and hands it to the
//! parser.
//!
//! # Quick Start
//!
//! ```
//! use uvcgraph::{Device, DeviceLayout};
//!
//! # fn snapshot() -> DeviceLayout { uvcgraph::DeviceLayout::default() }
//! let layout: DeviceLayout = snapshot();
//! match Device::parse(&layout) {
//!     Ok(device) => {
//!         for entity in device.entities() {
//!             println!("entity {}: {}", entity.id, entity.name);
//!         }
//!         if let Ok(chain) = device.scan_chain() {
//!             println!("chain ends at output terminal {}", chain.output_terminal.id);
//!         }
//!     }
//!     Err(e) => eprintln!("not a usable UVC device: {}", e),
//! }
//! ```
//!
//! # Input tolerance
//!
//! Descriptors are untrusted, vendor-variable input. Every read is bounds
//! checked against the record's declared length; known device bugs (zero
//! frame intervals, descriptors placed after endpoint descriptors,
//! out-of-range default intervals) are tolerated the way in-kernel drivers
//! tolerate them. Malformed records that cannot be safely skipped fail the
//! enclosing parse with a descriptive [`Error`].

use std::{error, fmt};

/// Error type for descriptor parsing and chain resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A descriptor record declared a length of zero, or a length or
    /// sub-length extending past the end of its region
    TruncatedDescriptor,

    /// A streaming interface declared no format this library supports
    UnsupportedFormat,

    /// A chain entity references a source id that does not exist
    UnresolvedReference(u8),

    /// The entity graph does not match any topology the chain scanner
    /// accepts (details are logged at debug level)
    BrokenTopology,

    /// No streaming output terminal yields a valid, interface-bound chain
    NoValidChain,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TruncatedDescriptor => write!(f, "truncated class-specific descriptor"),
            Error::UnsupportedFormat => {
                write!(f, "streaming interface has no supported format")
            }
            Error::UnresolvedReference(id) => {
                write!(f, "reference to unknown entity {}", id)
            }
            Error::BrokenTopology => write!(f, "unsupported device topology"),
            Error::NoValidChain => write!(f, "no valid video chain found"),
        }
    }
}

impl error::Error for Error {}

/// The descriptor module provides the bounds-checked record cursor.
pub mod descriptor;

/// The interval module provides frame-interval arithmetic helpers.
pub mod interval;

/// The fourcc module provides portable handling of fourcc codes.
pub mod fourcc;

/// The entity module provides the typed entity graph data model.
pub mod entity;

/// The control module parses Video Control descriptors into entities.
pub mod control;

/// The streaming module parses Video Streaming descriptors into format tables.
pub mod streaming;

/// The chain module resolves the video chain from the entity graph.
pub mod chain;

/// The device module ties parsing and resolution together.
pub mod device;

pub use chain::VideoChain;
pub use device::{AltSetting, Device, DeviceLayout, Endpoint, InterfaceLayout};
pub use entity::{Entity, EntityKind};
pub use streaming::{Colorspace, Format, Frame, StreamingInterface};
