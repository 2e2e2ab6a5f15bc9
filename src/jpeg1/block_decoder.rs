//! Entropy decoding of 8x8 coefficient blocks (ISO/IEC 10918-1 F.2.2).

use crate::error::{JpegError, Result};
use crate::jpeg1::bit_reader::JpegBitReader;
use crate::jpeg1::dct::BLOCK_DIM;
use crate::jpeg1::huffman::{HuffmanTable, receive_extend};
use crate::jpeg1::segments::COMPONENT_COUNT;

const MAX_DC_SIZE: u8 = 11;
const END_OF_BLOCK: u8 = 0x00;
const ZERO_RUN_LENGTH: u8 = 0xF0;
const ZERO_RUN: usize = 16;

/// Per-scan decoding state: the bit position in the entropy-coded data and
/// the running DC predictor of every component.
pub struct ScanDecoder<'a> {
    bit_reader: JpegBitReader<'a>,
    dc_predictors: [i32; COMPONENT_COUNT],
}

impl<'a> ScanDecoder<'a> {
    pub fn new(entropy_coded_data: &'a [u8]) -> Self {
        Self {
            bit_reader: JpegBitReader::new(entropy_coded_data),
            dc_predictors: [0; COMPONENT_COUNT],
        }
    }

    /// Bytes of entropy-coded data consumed so far.
    pub fn position(&self) -> usize {
        self.bit_reader.position()
    }

    pub fn dc_predictor(&self, component_index: usize) -> i32 {
        self.dc_predictors[component_index]
    }

    /// Decodes one block of `component_index` into zigzag order.
    pub fn decode_block(
        &mut self,
        component_index: usize,
        dc_table: &HuffmanTable,
        ac_table: &HuffmanTable,
    ) -> Result<[i32; BLOCK_DIM]> {
        let mut block = [0i32; BLOCK_DIM];

        // 1. Decode DC
        let dc_size = dc_table.decode(&mut self.bit_reader)?;
        if dc_size > MAX_DC_SIZE {
            return Err(JpegError::InvalidCoefficientSize { size: dc_size });
        }
        let dc_diff = receive_extend(&mut self.bit_reader, dc_size)?;
        let predictor = &mut self.dc_predictors[component_index];
        *predictor = predictor
            .checked_add(dc_diff)
            .ok_or(JpegError::DcPredictorOverflow {
                component: component_index,
            })?;
        block[0] = *predictor;

        // 2. Decode AC
        let mut k = 1;
        while k < BLOCK_DIM {
            let symbol = ac_table.decode(&mut self.bit_reader)?;
            match symbol {
                END_OF_BLOCK => break,
                ZERO_RUN_LENGTH => {
                    k += ZERO_RUN;
                    if k > BLOCK_DIM {
                        return Err(JpegError::CoefficientIndexOutOfRange { index: k });
                    }
                }
                _ => {
                    let run = (symbol >> 4) as usize;
                    let size = symbol & 0x0F;
                    k += run;
                    if k >= BLOCK_DIM {
                        return Err(JpegError::CoefficientIndexOutOfRange { index: k });
                    }
                    block[k] = receive_extend(&mut self.bit_reader, size)?;
                    k += 1;
                }
            }
        }

        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // DC: sizes 0..=3 -> codes 00, 01, 10, 110 (lengths 2, 2, 2, 3).
    fn dc_table() -> HuffmanTable {
        let mut lengths = [0u8; 16];
        lengths[1] = 3;
        lengths[2] = 1;
        HuffmanTable::build_from_dht(&lengths, &[0, 1, 2, 3]).unwrap()
    }

    // AC: EOB = 00, 0x01 = 01, 0xF0 = 10, 0x32 = 110, 0xE1 = 111.
    fn ac_table() -> HuffmanTable {
        let mut lengths = [0u8; 16];
        lengths[1] = 3;
        lengths[2] = 2;
        HuffmanTable::build_from_dht(&lengths, &[0x00, 0x01, 0xF0, 0x32, 0xE1]).unwrap()
    }

    fn bytes(bits: &str) -> Vec<u8> {
        let mut bits: String = bits.chars().filter(|c| !c.is_whitespace()).collect();
        while bits.len() % 8 != 0 {
            bits.push('1');
        }
        bits.as_bytes()
            .chunks(8)
            .map(|chunk| u8::from_str_radix(std::str::from_utf8(chunk).unwrap(), 2).unwrap())
            .flat_map(|b| if b == 0xFF { vec![0xFF, 0x00] } else { vec![b] })
            .collect()
    }

    #[test]
    fn dc_only_block() {
        // DC size 3, bits 101 (+5); EOB.
        let data = bytes("110 101 00");
        let mut decoder = ScanDecoder::new(&data);
        let block = decoder.decode_block(0, &dc_table(), &ac_table()).unwrap();
        assert_eq!(block[0], 5);
        assert!(block[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn dc_predictor_accumulates_per_component() {
        // A (comp 0): +5. B (comp 1): size 2, 01 -> -2. C (comp 0): size 1, 0 -> -1.
        let data = bytes("110 101 00  10 01 00  01 0 00");
        let mut decoder = ScanDecoder::new(&data);
        let (dc, ac) = (dc_table(), ac_table());
        assert_eq!(decoder.decode_block(0, &dc, &ac).unwrap()[0], 5);
        assert_eq!(decoder.decode_block(1, &dc, &ac).unwrap()[0], -2);
        assert_eq!(decoder.decode_block(0, &dc, &ac).unwrap()[0], 4);
        assert_eq!(decoder.dc_predictor(0), 4);
        assert_eq!(decoder.dc_predictor(1), -2);
        assert_eq!(decoder.dc_predictor(2), 0);
    }

    #[test]
    fn runs_and_zero_run_length() {
        // DC size 0. AC: 0x32 (run 3, size 2) with 11 -> +3 at k=4;
        // ZRL -> k=21; 0x01 with 0 -> -1 at k=21; EOB.
        let data = bytes("00 110 11 10 01 0 00");
        let mut decoder = ScanDecoder::new(&data);
        let block = decoder.decode_block(0, &dc_table(), &ac_table()).unwrap();
        assert_eq!(block[0], 0);
        assert_eq!(block[4], 3);
        assert_eq!(block[21], -1);
        assert_eq!(block.iter().filter(|&&c| c != 0).count(), 2);
    }

    #[test]
    fn full_block_ends_without_eob() {
        // 63 AC values of +1; the loop stops at k = 64 without an EOB symbol.
        let data = bytes(&format!("00 {}", "01 1 ".repeat(63)));
        let mut decoder = ScanDecoder::new(&data);
        let block = decoder.decode_block(0, &dc_table(), &ac_table()).unwrap();
        assert!(block[1..].iter().all(|&c| c == 1));
    }

    #[test]
    fn run_past_end_of_block_is_rejected() {
        // Four ZRLs reach k = 65.
        let data = bytes("00 10 10 10 10");
        let mut decoder = ScanDecoder::new(&data);
        assert_eq!(
            decoder.decode_block(0, &dc_table(), &ac_table()).unwrap_err(),
            JpegError::CoefficientIndexOutOfRange { index: 65 }
        );

        // 0xE1 at k=60 -> run 14 lands on 74.
        let data = bytes(&format!("00 10 10 10 {} 111 1", "01 1 ".repeat(11)));
        let mut decoder = ScanDecoder::new(&data);
        assert_eq!(
            decoder.decode_block(0, &dc_table(), &ac_table()).unwrap_err(),
            JpegError::CoefficientIndexOutOfRange { index: 74 }
        );
    }

    #[test]
    fn dc_predictor_overflow_is_rejected() {
        // DC size 3, bits 101 (+5).
        let data = bytes("110 101 00");
        let mut decoder = ScanDecoder::new(&data);
        decoder.dc_predictors[2] = i32::MAX - 4;
        let err = decoder.decode_block(2, &dc_table(), &ac_table()).unwrap_err();
        assert_eq!(err, JpegError::DcPredictorOverflow { component: 2 });
        assert_eq!(err.kind(), crate::error::ErrorKind::Format);

        let mut decoder = ScanDecoder::new(&data);
        decoder.dc_predictors[0] = i32::MAX - 5;
        assert_eq!(decoder.decode_block(0, &dc_table(), &ac_table()).unwrap()[0], i32::MAX);
    }
}
