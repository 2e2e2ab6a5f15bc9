//! Interpreters for the DQT, DHT, SOF0 and SOS marker segments.
//!
//! Each function takes the segment payload (the bytes after the length field).
//! DQT and DHT payloads may carry several tables back to back; they are
//! consumed in a loop until the payload is exhausted.

use crate::error::{JpegError, Result};
use crate::jpeg_stream_reader::JpegStreamReader;
use crate::jpeg_marker_code::SEGMENT_LENGTH_SIZE;
use crate::jpeg1::dct::BLOCK_DIM;
use crate::jpeg1::huffman::{AC_TABLE_CLASS, DC_TABLE_CLASS, HuffmanTable, MAX_CODE_LENGTH};
use crate::jpeg1::quantization::QuantizationTable;
use tracing::{debug, trace};

pub const MAX_TABLE_ID: u8 = 3;
pub const TABLE_SLOTS: usize = MAX_TABLE_ID as usize + 1;
pub const COMPONENT_COUNT: usize = 3;
pub const SUPPORTED_PRECISION: u8 = 8;
pub const MAX_SAMPLING_FACTOR: u8 = 4;

/// Tables defined so far in the stream. Later definitions with the same
/// destination replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct JpegTables {
    pub quantization: [Option<QuantizationTable>; TABLE_SLOTS],
    pub huffman_dc: [Option<HuffmanTable>; TABLE_SLOTS],
    pub huffman_ac: [Option<HuffmanTable>; TABLE_SLOTS],
}

impl JpegTables {
    pub fn quantization_table(&self, id: u8) -> Result<&QuantizationTable> {
        self.quantization
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(JpegError::MissingQuantizationTable { id })
    }

    pub fn huffman_table(&self, class: u8, id: u8) -> Result<&HuffmanTable> {
        let slots = if class == DC_TABLE_CLASS {
            &self.huffman_dc
        } else {
            &self.huffman_ac
        };
        slots
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(JpegError::MissingHuffmanTable { class, id })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub horizontal_sampling: u8,
    pub vertical_sampling: u8,
    pub quant_table_id: u8,
}

impl FrameComponent {
    /// 8x8 blocks of this component in one MCU.
    pub fn blocks_per_mcu(&self) -> usize {
        self.horizontal_sampling as usize * self.vertical_sampling as usize
    }
}

/// SOF0 contents. Components are kept in frame order: Y, Cb, Cr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: [FrameComponent; COMPONENT_COUNT],
}

impl FrameHeader {
    pub fn max_horizontal_sampling(&self) -> u8 {
        self.components
            .iter()
            .map(|c| c.horizontal_sampling)
            .max()
            .unwrap_or(1)
    }

    pub fn max_vertical_sampling(&self) -> u8 {
        self.components
            .iter()
            .map(|c| c.vertical_sampling)
            .max()
            .unwrap_or(1)
    }

    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    pub fn blocks_per_mcu(&self) -> usize {
        self.components.iter().map(FrameComponent::blocks_per_mcu).sum()
    }

    /// Position of the first block of component `index` within an MCU's
    /// blocks, which are grouped in frame component order.
    pub fn first_block(&self, index: usize) -> usize {
        self.components[..index]
            .iter()
            .map(FrameComponent::blocks_per_mcu)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    /// Index into [`FrameHeader::components`].
    pub component_index: usize,
    pub dc_table_id: u8,
    pub ac_table_id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: [ScanComponent; COMPONENT_COUNT],
}

fn invalid_size(payload: &[u8]) -> JpegError {
    JpegError::InvalidMarkerSegmentSize {
        size: (payload.len() + SEGMENT_LENGTH_SIZE).min(u16::MAX as usize) as u16,
    }
}

/// DQT: `Pq|Tq` followed by 64 entries of 1 (Pq = 0) or 2 (Pq = 1) bytes.
pub fn parse_dqt(payload: &[u8], tables: &mut JpegTables) -> Result<()> {
    let mut reader = JpegStreamReader::new(payload);
    while !reader.is_empty() {
        let pq_tq = reader.read_u8()?;
        let precision = pq_tq >> 4;
        let id = pq_tq & 0x0F;
        if precision > 1 {
            return Err(JpegError::InvalidQuantizationTablePrecision { precision });
        }
        if id > MAX_TABLE_ID {
            return Err(JpegError::InvalidTableId { id });
        }

        let entry_size = precision as usize + 1;
        if reader.remaining_len() < BLOCK_DIM * entry_size {
            return Err(JpegError::InvalidQuantizationTableSegment);
        }
        let mut values = [0u16; BLOCK_DIM];
        for value in values.iter_mut() {
            *value = if precision == 0 {
                reader.read_u8()? as u16
            } else {
                reader.read_u16()?
            };
        }
        debug!(id, precision, "quantization table");
        tables.quantization[id as usize] = Some(QuantizationTable::new(values));
    }
    Ok(())
}

/// DHT: `Tc|Th`, 16 code-length counts, then the symbols.
pub fn parse_dht(payload: &[u8], tables: &mut JpegTables) -> Result<()> {
    let mut reader = JpegStreamReader::new(payload);
    while !reader.is_empty() {
        let tc_th = reader.read_u8()?;
        let class = tc_th >> 4;
        let id = tc_th & 0x0F;
        if class != DC_TABLE_CLASS && class != AC_TABLE_CLASS {
            return Err(JpegError::InvalidHuffmanTableClass { class });
        }
        if id > MAX_TABLE_ID {
            return Err(JpegError::InvalidTableId { id });
        }

        if reader.remaining_len() < MAX_CODE_LENGTH {
            return Err(JpegError::InvalidHuffmanTableSegment);
        }
        let mut lengths = [0u8; MAX_CODE_LENGTH];
        lengths.copy_from_slice(reader.read_bytes(MAX_CODE_LENGTH)?);

        let declared: usize = lengths.iter().map(|&n| n as usize).sum();
        if reader.remaining_len() < declared {
            return Err(JpegError::HuffmanSymbolCountMismatch {
                declared,
                available: reader.remaining_len(),
            });
        }
        let values = reader.read_bytes(declared)?;

        let table = HuffmanTable::build_from_dht(&lengths, values)?;
        debug!(class, id, symbols = declared, "huffman table");
        if class == DC_TABLE_CLASS {
            tables.huffman_dc[id as usize] = Some(table);
        } else {
            tables.huffman_ac[id as usize] = Some(table);
        }
    }
    Ok(())
}

/// SOF0: precision, height, width, component count, then per component
/// `C`, `H|V`, `Tq`.
pub fn parse_sof(payload: &[u8]) -> Result<FrameHeader> {
    const FIXED_SIZE: usize = 6;
    if payload.len() < FIXED_SIZE {
        return Err(invalid_size(payload));
    }
    let mut reader = JpegStreamReader::new(payload);
    let precision = reader.read_u8()?;
    let height = reader.read_u16()?;
    let width = reader.read_u16()?;
    let count = reader.read_u8()?;

    if precision != SUPPORTED_PRECISION {
        return Err(JpegError::UnsupportedPrecision { precision });
    }
    if count as usize != COMPONENT_COUNT {
        return Err(JpegError::UnsupportedComponentCount { count });
    }
    if payload.len() != FIXED_SIZE + 3 * COMPONENT_COUNT {
        return Err(invalid_size(payload));
    }
    if width == 0 || height == 0 {
        return Err(JpegError::InvalidDimensions { width, height });
    }

    let mut components = [FrameComponent {
        id: 0,
        horizontal_sampling: 1,
        vertical_sampling: 1,
        quant_table_id: 0,
    }; COMPONENT_COUNT];
    for i in 0..COMPONENT_COUNT {
        let id = reader.read_u8()?;
        let sampling = reader.read_u8()?;
        let quant_table_id = reader.read_u8()?;

        let horizontal = sampling >> 4;
        let vertical = sampling & 0x0F;
        if !(1..=MAX_SAMPLING_FACTOR).contains(&horizontal)
            || !(1..=MAX_SAMPLING_FACTOR).contains(&vertical)
        {
            return Err(JpegError::InvalidSamplingFactor {
                horizontal,
                vertical,
            });
        }
        if quant_table_id > MAX_TABLE_ID {
            return Err(JpegError::InvalidTableId { id: quant_table_id });
        }
        if components[..i].iter().any(|c| c.id == id) {
            return Err(JpegError::DuplicateComponentId { id });
        }
        components[i] = FrameComponent {
            id,
            horizontal_sampling: horizontal,
            vertical_sampling: vertical,
            quant_table_id,
        };
    }

    let frame = FrameHeader {
        precision,
        height,
        width,
        components,
    };
    debug!(
        width,
        height,
        sampling = ?frame.components.map(|c| (c.horizontal_sampling, c.vertical_sampling)),
        "frame header"
    );
    Ok(frame)
}

/// SOS: component count, per component `Cs`, `Td|Ta`, then Ss, Se, Ah|Al.
pub fn parse_sos(payload: &[u8], frame: &FrameHeader) -> Result<ScanHeader> {
    if payload.is_empty() {
        return Err(invalid_size(payload));
    }
    let mut reader = JpegStreamReader::new(payload);
    let count = reader.read_u8()?;
    if count as usize != COMPONENT_COUNT {
        return Err(JpegError::UnsupportedComponentCount { count });
    }
    if payload.len() != 1 + 2 * COMPONENT_COUNT + 3 {
        return Err(invalid_size(payload));
    }

    let mut components = [ScanComponent {
        component_index: 0,
        dc_table_id: 0,
        ac_table_id: 0,
    }; COMPONENT_COUNT];
    for i in 0..COMPONENT_COUNT {
        let id = reader.read_u8()?;
        let selector = reader.read_u8()?;
        let component_index = frame
            .component_index(id)
            .ok_or(JpegError::UnknownComponentId { id })?;
        if components[..i].iter().any(|c| c.component_index == component_index) {
            return Err(JpegError::DuplicateComponentId { id });
        }
        let dc_table_id = selector >> 4;
        let ac_table_id = selector & 0x0F;
        if dc_table_id > MAX_TABLE_ID {
            return Err(JpegError::InvalidTableId { id: dc_table_id });
        }
        if ac_table_id > MAX_TABLE_ID {
            return Err(JpegError::InvalidTableId { id: ac_table_id });
        }
        components[i] = ScanComponent {
            component_index,
            dc_table_id,
            ac_table_id,
        };
    }

    let spectral_start = reader.read_u8()?;
    let spectral_end = reader.read_u8()?;
    let approximation = reader.read_u8()?;
    trace!(spectral_start, spectral_end, approximation, "scan parameters (ignored)");
    debug!(
        tables = ?components.map(|c| (c.dc_table_id, c.ac_table_id)),
        "scan header"
    );
    Ok(ScanHeader { components })
}
