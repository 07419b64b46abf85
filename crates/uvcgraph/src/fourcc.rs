// SPDX-License-Identifier: Apache-2.0

//! Four-character pixel format codes and the UVC format GUID mapping.

use core::fmt;

/// GUID suffix shared by the UVC uncompressed format family. The first four
/// bytes of such a GUID are the fourcc itself.
const UVC_GUID_TAIL: [u8; 12] = [
    0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// YUV 4:2:2 packed (YUY2 / YUYV)
    pub const YUY2: FourCC = FourCC(*b"YUY2");

    /// YUV 4:2:0 semi-planar
    pub const NV12: FourCC = FourCC(*b"NV12");

    /// Motion JPEG
    pub const MJPG: FourCC = FourCC(*b"MJPG");

    /// Map an uncompressed-format GUID to its fourcc.
    ///
    /// The UVC uncompressed format GUIDs all embed the fourcc in their first
    /// four bytes followed by a fixed tail, so an unknown GUID with the
    /// standard tail still yields a usable code. GUIDs outside the family
    /// map to `None`.
    pub fn from_guid(guid: &[u8; 16]) -> Option<FourCC> {
        if guid[4..] == UVC_GUID_TAIL {
            Some(FourCC([guid[0], guid[1], guid[2], guid[3]]))
        } else {
            None
        }
    }

    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(buf: &[u8; 4]) -> FourCC {
        FourCC(*buf)
    }
}

impl From<u32> for FourCC {
    fn from(val: u32) -> FourCC {
        FourCC(val.to_le_bytes())
    }
}

impl From<FourCC> for u32 {
    fn from(val: FourCC) -> Self {
        val.as_u32()
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match core::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => {
                // Returning fmt::Error would make format!() panic, so use an
                // escaped representation instead.
                let b = &self.0;
                f.write_fmt(format_args!(
                    "{}{}{}{}",
                    core::ascii::escape_default(b[0]),
                    core::ascii::escape_default(b[1]),
                    core::ascii::escape_default(b[2]),
                    core::ascii::escape_default(b[3])
                ))
            }
        }
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let b = self.0;
        f.debug_tuple("FourCC")
            .field(&format_args!(
                "{}{}{}{}",
                core::ascii::escape_default(b[0]),
                core::ascii::escape_default(b[1]),
                core::ascii::escape_default(b[2]),
                core::ascii::escape_default(b[3])
            ))
            .finish()
    }
}
