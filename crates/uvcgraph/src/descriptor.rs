// SPDX-License-Identifier: Apache-2.0

//! Bounds-checked cursor over a class-specific descriptor byte region.
//!
//! USB descriptors are a sequence of length-prefixed records: byte 0 is the
//! total record length, byte 1 the descriptor type, byte 2 (for the records
//! this library cares about) the class-specific subtype. The cursor hands
//! out one record slice at a time and guarantees the caller never reads
//! past the end of the region; it performs no interpretation of payload
//! bytes.

use crate::Error;

/// Descriptor type marking a class-specific interface record.
pub const CS_INTERFACE: u8 = 0x24;

/// Video Control descriptor subtypes.
pub mod vc {
    pub const HEADER: u8 = 0x01;
    pub const INPUT_TERMINAL: u8 = 0x02;
    pub const OUTPUT_TERMINAL: u8 = 0x03;
    pub const SELECTOR_UNIT: u8 = 0x04;
    pub const PROCESSING_UNIT: u8 = 0x05;
    pub const EXTENSION_UNIT: u8 = 0x06;
}

/// Video Streaming descriptor subtypes.
pub mod vs {
    pub const INPUT_HEADER: u8 = 0x01;
    pub const OUTPUT_HEADER: u8 = 0x02;
    pub const STILL_IMAGE_FRAME: u8 = 0x03;
    pub const FORMAT_UNCOMPRESSED: u8 = 0x04;
    pub const FRAME_UNCOMPRESSED: u8 = 0x05;
    pub const FORMAT_MJPEG: u8 = 0x06;
    pub const FRAME_MJPEG: u8 = 0x07;
    pub const FORMAT_MPEG2TS: u8 = 0x0a;
    pub const FORMAT_DV: u8 = 0x0c;
    pub const COLORFORMAT: u8 = 0x0d;
    pub const FORMAT_FRAME_BASED: u8 = 0x10;
    pub const FORMAT_STREAM_BASED: u8 = 0x12;
}

/// Terminal type codes.
pub mod terminal {
    /// USB streaming terminal (the output side of a capture chain).
    pub const TT_STREAMING: u16 = 0x0101;

    pub const ITT_VENDOR_SPECIFIC: u16 = 0x0200;
    pub const ITT_CAMERA: u16 = 0x0201;
    pub const ITT_MEDIA_TRANSPORT_INPUT: u16 = 0x0202;
}

/// One length-delimited descriptor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    bytes: &'a [u8],
}

impl<'a> Record<'a> {
    /// Descriptor type (byte 1).
    pub fn descriptor_type(&self) -> u8 {
        self.bytes[1]
    }

    /// Class-specific subtype tag (byte 2).
    pub fn subtype(&self) -> u8 {
        self.bytes[2]
    }

    /// The whole record, length prefix included.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Little-endian u16 at `offset`, bounds checked against the record.
    pub fn u16_at(&self, offset: usize) -> Result<u16, Error> {
        let b = self
            .bytes
            .get(offset..offset + 2)
            .ok_or(Error::TruncatedDescriptor)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Little-endian u32 at `offset`, bounds checked against the record.
    pub fn u32_at(&self, offset: usize) -> Result<u32, Error> {
        let b = self
            .bytes
            .get(offset..offset + 4)
            .ok_or(Error::TruncatedDescriptor)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Byte at `offset`, bounds checked against the record.
    pub fn u8_at(&self, offset: usize) -> Result<u8, Error> {
        self.bytes.get(offset).copied().ok_or(Error::TruncatedDescriptor)
    }

    /// Sub-slice `offset..offset + len`, bounds checked against the record.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], Error> {
        self.bytes
            .get(offset..offset + len)
            .ok_or(Error::TruncatedDescriptor)
    }
}

/// Sequential reader over a descriptor region.
#[derive(Debug, Clone)]
pub struct DescriptorReader<'a> {
    remaining: &'a [u8],
}

impl<'a> DescriptorReader<'a> {
    pub fn new(region: &'a [u8]) -> Self {
        DescriptorReader { remaining: region }
    }

    /// Whether fewer than the minimum 3 record bytes remain.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.len() <= 2
    }

    /// Subtype of the next record without consuming it, if any.
    pub fn peek_subtype(&self) -> Option<u8> {
        if self.is_exhausted() {
            None
        } else {
            Some(self.remaining[2])
        }
    }

    /// Yield the next record of any descriptor type.
    ///
    /// Returns `Ok(None)` once fewer than 3 bytes remain. A record whose
    /// declared length is zero or exceeds the remaining bytes fails with
    /// [`Error::TruncatedDescriptor`].
    pub fn next_record(&mut self) -> Result<Option<Record<'a>>, Error> {
        if self.is_exhausted() {
            return Ok(None);
        }

        let len = self.remaining[0] as usize;
        if len == 0 || len > self.remaining.len() {
            return Err(Error::TruncatedDescriptor);
        }

        let (record, rest) = self.remaining.split_at(len);
        self.remaining = rest;
        Ok(Some(Record { bytes: record }))
    }

    /// Yield the next class-specific interface record, skipping standard
    /// USB descriptors (endpoint, interface, ...) in between.
    pub fn next_class_specific(&mut self) -> Result<Option<Record<'a>>, Error> {
        while let Some(record) = self.next_record()? {
            if record.descriptor_type() == CS_INTERFACE {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_records() {
        let region = [3, CS_INTERFACE, 0x01, 4, CS_INTERFACE, 0x02, 0xaa];
        let mut reader = DescriptorReader::new(&region);

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(first.subtype(), 0x01);
        assert_eq!(first.len(), 3);

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.subtype(), 0x02);
        assert_eq!(second.bytes()[3], 0xaa);

        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_trailing_short_bytes_end_iteration() {
        let region = [3, CS_INTERFACE, 0x01, 0xff, 0xff];
        let mut reader = DescriptorReader::new(&region);
        assert!(reader.next_record().unwrap().is_some());
        // Two bytes left: not enough for a record, not an error.
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_zero_length_record() {
        let region = [0, CS_INTERFACE, 0x01];
        let mut reader = DescriptorReader::new(&region);
        assert_eq!(reader.next_record(), Err(Error::TruncatedDescriptor));
    }

    #[test]
    fn test_overlong_record() {
        let region = [10, CS_INTERFACE, 0x01, 0, 0];
        let mut reader = DescriptorReader::new(&region);
        assert_eq!(reader.next_record(), Err(Error::TruncatedDescriptor));
    }

    #[test]
    fn test_skips_standard_descriptors() {
        // An endpoint descriptor (type 0x05) ahead of the class-specific one.
        let region = [7, 0x05, 0, 0, 0, 0, 0, 3, CS_INTERFACE, 0x42];
        let mut reader = DescriptorReader::new(&region);
        let record = reader.next_class_specific().unwrap().unwrap();
        assert_eq!(record.subtype(), 0x42);
    }

    #[test]
    fn test_record_field_accessors() {
        let region = [9, CS_INTERFACE, 0x03, 5, 0x01, 0x01, 0, 4, 0];
        let mut reader = DescriptorReader::new(&region);
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.u8_at(3).unwrap(), 5);
        assert_eq!(record.u16_at(4).unwrap(), 0x0101);
        assert_eq!(record.u8_at(9), Err(Error::TruncatedDescriptor));
        assert_eq!(record.u32_at(6), Err(Error::TruncatedDescriptor));
        assert_eq!(record.slice(4, 2).unwrap(), &[0x01, 0x01]);
    }
}
