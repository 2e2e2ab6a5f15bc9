//! MSB-first bit reader over entropy-coded data with byte-stuffing removal.

use crate::error::{JpegError, Result};
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JPEG_STUFFING_BYTE};

/// Reads single bits from a stuffed byte stream.
///
/// Every `0xFF` data byte must be followed by a `0x00` stuffing byte, which is
/// discarded. Restart markers and other markers inside the scan are not
/// supported and surface as [`JpegError::UnexpectedMarkerInScan`].
pub struct JpegBitReader<'a> {
    source: &'a [u8],
    position: usize,
    current_byte: u8,
    bits_left: u8,
}

impl<'a> JpegBitReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
            current_byte: 0,
            bits_left: 0,
        }
    }

    /// Number of source bytes consumed so far, stuffing bytes included.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next_bit(&mut self) -> Result<u8> {
        if self.bits_left == 0 {
            self.current_byte = self.read_byte_unstuffed()?;
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        Ok((self.current_byte >> self.bits_left) & 1)
    }

    /// Reads `count` bits (at most 16), first bit most significant.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        debug_assert!(count <= 16);
        let mut value = 0u16;
        for _ in 0..count {
            value = (value << 1) | self.next_bit()? as u16;
        }
        Ok(value)
    }

    fn read_byte_unstuffed(&mut self) -> Result<u8> {
        let byte = *self
            .source
            .get(self.position)
            .ok_or(JpegError::UnexpectedEndOfData)?;
        self.position += 1;

        if byte == JPEG_MARKER_START_BYTE {
            let next_byte = *self
                .source
                .get(self.position)
                .ok_or(JpegError::UnexpectedEndOfData)?;
            if next_byte != JPEG_STUFFING_BYTE {
                return Err(JpegError::UnexpectedMarkerInScan { marker: next_byte });
            }
            self.position += 1;
        }
        Ok(byte)
    }
}
