//! Byte-level cursor over a JPEG container.
//!
//! Used both for the top-level marker walk and, on a segment payload slice,
//! by the segment interpreters.

use crate::error::{JpegError, Result};
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, SEGMENT_LENGTH_SIZE};
use tracing::warn;

pub struct JpegStreamReader<'a> {
    source: &'a [u8],
    position: usize,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_data(&self) -> &'a [u8] {
        &self.source[self.position..]
    }

    pub fn remaining_len(&self) -> usize {
        self.source.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining_len() {
            return Err(JpegError::UnexpectedEndOfData);
        }
        self.position += count;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let val = *self
            .source
            .get(self.position)
            .ok_or(JpegError::UnexpectedEndOfData)?;
        self.position += 1;
        Ok(val)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b1 = self.read_u8()? as u16;
        let b2 = self.read_u8()? as u16;
        Ok((b1 << 8) | b2)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining_len() {
            return Err(JpegError::UnexpectedEndOfData);
        }
        let bytes = &self.source[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Reads `0xFF` followed by a marker code and returns the code byte.
    /// Fill bytes (extra `0xFF`) before the code are skipped.
    pub fn read_marker(&mut self) -> Result<u8> {
        let found = self.read_u8()?;
        if found != JPEG_MARKER_START_BYTE {
            return Err(JpegError::JpegMarkerStartByteNotFound { found });
        }
        let mut code = self.read_u8()?;
        let mut fill_bytes = 0usize;
        while code == JPEG_MARKER_START_BYTE {
            fill_bytes += 1;
            code = self.read_u8()?;
        }
        if fill_bytes > 0 {
            warn!(fill_bytes, code, "skipped fill bytes before marker");
        }
        if code == 0x00 {
            return Err(JpegError::JpegMarkerStartByteNotFound { found: code });
        }
        Ok(code)
    }

    /// Reads a segment length field and returns the payload that follows it.
    pub fn read_segment_payload(&mut self) -> Result<&'a [u8]> {
        let size = self.read_u16()?;
        if (size as usize) < SEGMENT_LENGTH_SIZE {
            return Err(JpegError::InvalidMarkerSegmentSize { size });
        }
        self.read_bytes(size as usize - SEGMENT_LENGTH_SIZE)
    }

    pub fn skip_segment(&mut self) -> Result<()> {
        self.read_segment_payload().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_reads() {
        let mut reader = JpegStreamReader::new(&[0x12, 0x34, 0x56]);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u8().unwrap(), 0x56);
        assert_eq!(reader.read_u8(), Err(JpegError::UnexpectedEndOfData));
    }

    #[test]
    fn marker_with_fill_bytes() {
        let mut reader = JpegStreamReader::new(&[0xFF, 0xFF, 0xFF, 0xD8]);
        assert_eq!(reader.read_marker().unwrap(), 0xD8);
        assert!(reader.is_empty());
    }

    #[test]
    fn marker_requires_start_byte() {
        let mut reader = JpegStreamReader::new(&[0x12, 0xD8]);
        assert_eq!(
            reader.read_marker(),
            Err(JpegError::JpegMarkerStartByteNotFound { found: 0x12 })
        );
    }

    #[test]
    fn segment_payload_bounds() {
        let mut reader = JpegStreamReader::new(&[0x00, 0x04, 0xAA, 0xBB, 0xCC]);
        assert_eq!(reader.read_segment_payload().unwrap(), &[0xAA, 0xBB]);
        assert_eq!(reader.remaining_data(), &[0xCC]);

        let mut short = JpegStreamReader::new(&[0x00, 0x08, 0xAA]);
        assert_eq!(short.read_segment_payload(), Err(JpegError::UnexpectedEndOfData));

        let mut invalid = JpegStreamReader::new(&[0x00, 0x01]);
        assert_eq!(
            invalid.read_segment_payload(),
            Err(JpegError::InvalidMarkerSegmentSize { size: 1 })
        );
    }
}
