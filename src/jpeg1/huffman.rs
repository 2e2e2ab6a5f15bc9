//! Canonical Huffman tables for baseline JPEG (ISO/IEC 10918-1 Annex C, F.2.2.3).

use crate::error::{JpegError, Result};
use crate::jpeg1::bit_reader::JpegBitReader;

pub const MAX_CODE_LENGTH: usize = 16;

/// Table class as signalled in the high nibble of a DHT table header.
pub const DC_TABLE_CLASS: u8 = 0;
pub const AC_TABLE_CLASS: u8 = 1;

/// Represents a Huffman code with its bit value and length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    pub value: u16,
    pub length: u8,
}

/// Decodable Huffman table built from DHT code-length counts and symbols.
///
/// Decoding walks one bit at a time and compares against the largest code of
/// each length, so no per-code map is needed.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    lengths: [u8; MAX_CODE_LENGTH],
    values: Vec<u8>,
    codes: Vec<HuffmanCode>,

    min_code: [i32; MAX_CODE_LENGTH],
    max_code: [i32; MAX_CODE_LENGTH],
    val_ptr: [usize; MAX_CODE_LENGTH],
}

impl HuffmanTable {
    /// Builds a table from JPEG DHT lengths (`lengths[i]` = number of codes of
    /// length `i + 1`) and the symbols in code order.
    pub fn build_from_dht(lengths: &[u8; MAX_CODE_LENGTH], values: &[u8]) -> Result<Self> {
        let declared: usize = lengths.iter().map(|&n| n as usize).sum();
        if declared != values.len() {
            return Err(JpegError::HuffmanSymbolCountMismatch {
                declared,
                available: values.len(),
            });
        }

        let mut table = Self {
            lengths: *lengths,
            values: values.to_vec(),
            codes: Vec::with_capacity(values.len()),
            min_code: [0; MAX_CODE_LENGTH],
            max_code: [-1; MAX_CODE_LENGTH],
            val_ptr: [0; MAX_CODE_LENGTH],
        };

        let mut code = 0u32;
        let mut val_idx = 0;
        for (i, &count) in lengths.iter().enumerate() {
            let length = i + 1;
            if count > 0 {
                table.val_ptr[i] = val_idx;
                table.min_code[i] = code as i32;
                for _ in 0..count {
                    // Codes of this length must fit in `length` bits.
                    if code >= 1 << length {
                        return Err(JpegError::HuffmanCodeTooLong);
                    }
                    table.codes.push(HuffmanCode {
                        value: code as u16,
                        length: length as u8,
                    });
                    code += 1;
                    val_idx += 1;
                }
                table.max_code[i] = code as i32 - 1;
            }
            code <<= 1;
        }
        Ok(table)
    }

    pub fn lengths(&self) -> &[u8; MAX_CODE_LENGTH] {
        &self.lengths
    }

    pub fn symbol_count(&self) -> usize {
        self.values.len()
    }

    /// Generated codes paired with the symbols they are bound to, in code order.
    pub fn codes(&self) -> impl Iterator<Item = (HuffmanCode, u8)> + '_ {
        self.codes.iter().copied().zip(self.values.iter().copied())
    }

    /// Decodes the next symbol from the given JpegBitReader.
    pub fn decode(&self, reader: &mut JpegBitReader) -> Result<u8> {
        let mut code = 0i32;
        for i in 0..MAX_CODE_LENGTH {
            code = (code << 1) | reader.next_bit()? as i32;
            if code <= self.max_code[i] {
                let idx = self.val_ptr[i] + (code - self.min_code[i]) as usize;
                return Ok(self.values[idx]);
            }
        }
        Err(JpegError::InvalidHuffmanCode)
    }
}

/// Decodes a `size`-bit magnitude code into its signed value (F.2.2.1, EXTEND).
///
/// A leading 1 bit means the code is the value itself; a leading 0 means the
/// value is the negated bitwise complement of the code.
pub fn decode_value_bits(bits: u16, size: u8) -> i32 {
    if size == 0 {
        return 0;
    }
    let threshold = 1i32 << (size - 1);
    let bits = bits as i32;
    if bits >= threshold {
        bits
    } else {
        bits - (1 << size) + 1
    }
}

/// Reads `size` extra bits and decodes them as a signed value.
pub fn receive_extend(reader: &mut JpegBitReader, size: u8) -> Result<i32> {
    if size == 0 {
        return Ok(0);
    }
    if size as usize > MAX_CODE_LENGTH {
        return Err(JpegError::InvalidCoefficientSize { size });
    }
    let bits = reader.read_bits(size)?;
    Ok(decode_value_bits(bits, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    // Table K.3: luminance DC.
    const LUMINANCE_DC_LENGTHS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
    const LUMINANCE_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

    fn encode_value(value: i32) -> (u16, u8) {
        let size = (32 - value.unsigned_abs().leading_zeros()) as u8;
        let bits = if value >= 0 {
            value
        } else {
            value + (1 << size) - 1
        };
        (bits as u16, size)
    }

    fn pack_bits(codes: &[HuffmanCode]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut acc = 0u32;
        let mut n = 0u32;
        for code in codes {
            acc = (acc << code.length) | code.value as u32;
            n += code.length as u32;
            while n >= 8 {
                n -= 8;
                let byte = (acc >> n) as u8;
                out.push(byte);
                if byte == 0xFF {
                    out.push(0x00);
                }
            }
        }
        if n > 0 {
            let byte = ((acc << (8 - n)) | ((1 << (8 - n)) - 1)) as u8;
            out.push(byte);
            if byte == 0xFF {
                out.push(0x00);
            }
        }
        out
    }

    #[test]
    fn canonical_codes_for_luminance_dc() {
        let table =
            HuffmanTable::build_from_dht(&LUMINANCE_DC_LENGTHS, &LUMINANCE_DC_VALUES).unwrap();
        let codes: Vec<(u16, u8)> = table.codes().map(|(c, _)| (c.value, c.length)).collect();
        assert_eq!(
            &codes[..8],
            &[
                (0b00, 2),
                (0b010, 3),
                (0b011, 3),
                (0b100, 3),
                (0b101, 3),
                (0b110, 3),
                (0b1110, 4),
                (0b11110, 5)
            ]
        );
        assert_eq!(table.symbol_count(), 12);
    }

    #[test]
    fn first_code_after_empty_lengths_is_shifted() {
        let mut lengths = [0u8; 16];
        lengths[2] = 1;
        lengths[4] = 1;
        let table = HuffmanTable::build_from_dht(&lengths, &[7, 9]).unwrap();
        let codes: Vec<HuffmanCode> = table.codes().map(|(c, _)| c).collect();
        assert_eq!(codes[0], HuffmanCode { value: 0b000, length: 3 });
        assert_eq!(codes[1], HuffmanCode { value: 0b00100, length: 5 });
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = HuffmanTable::build_from_dht(&LUMINANCE_DC_LENGTHS, &LUMINANCE_DC_VALUES[..5])
            .unwrap_err();
        assert_eq!(
            err,
            JpegError::HuffmanSymbolCountMismatch {
                declared: 12,
                available: 5
            }
        );
    }

    #[test]
    fn overfull_table_is_rejected() {
        let mut lengths = [0u8; 16];
        lengths[0] = 3;
        assert_eq!(
            HuffmanTable::build_from_dht(&lengths, &[1, 2, 3]).unwrap_err(),
            JpegError::HuffmanCodeTooLong
        );
    }

    #[test]
    fn unassigned_code_fails_after_sixteen_bits() {
        let mut lengths = [0u8; 16];
        lengths[0] = 1;
        let table = HuffmanTable::build_from_dht(&lengths, &[5]).unwrap();
        // Code "0" is the only one; a run of ones never matches.
        let data = [0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00];
        let mut reader = JpegBitReader::new(&data);
        assert_eq!(table.decode(&mut reader), Err(JpegError::InvalidHuffmanCode));
    }

    #[test]
    fn every_generated_code_decodes_to_its_symbol() {
        arbtest::arbtest(|u| {
            // Random Kraft-valid length distribution.
            let mut lengths = [0u8; 16];
            let mut available = 2u32;
            let mut total = 0usize;
            for length in lengths.iter_mut() {
                let take = u.int_in_range(0..=available.min(12))?;
                let take = take.min(255 - total as u32);
                *length = take as u8;
                total += take as usize;
                available = (available - take) * 2;
            }
            if total == 0 {
                return Ok(());
            }
            let values: Vec<u8> = (0..total).map(|i| i as u8).collect();
            let table = HuffmanTable::build_from_dht(&lengths, &values).unwrap();

            let all: Vec<(HuffmanCode, u8)> = table.codes().collect();
            for (i, (a, _)) in all.iter().enumerate() {
                for (b, _) in &all[i + 1..] {
                    let prefix = b.value >> (b.length - a.length);
                    assert_ne!(prefix, a.value, "{a:?} is a prefix of {b:?}");
                }
            }

            let picks: Vec<(HuffmanCode, u8)> = (0..8)
                .map(|_| u.choose(&all).copied())
                .collect::<std::result::Result<_, _>>()?;
            let data = pack_bits(&picks.iter().map(|(c, _)| *c).collect::<Vec<_>>());
            let mut reader = JpegBitReader::new(&data);
            for (_, symbol) in &picks {
                assert_eq!(table.decode(&mut reader).unwrap(), *symbol);
            }
            Ok(())
        });
    }

    #[test]
    fn signed_values_round_trip_for_all_sizes() {
        for size in 1..=11u8 {
            let max = (1i32 << size) - 1;
            let min_magnitude = 1i32 << (size - 1);
            for value in [min_magnitude, max, -min_magnitude, -max] {
                let (bits, encoded_size) = encode_value(value);
                assert_eq!(encoded_size, size);
                assert_eq!(decode_value_bits(bits, size), value);
            }
        }
        assert_eq!(decode_value_bits(0b101, 3), 5);
        assert_eq!(decode_value_bits(0b010, 3), -5);
        assert_eq!(decode_value_bits(0, 0), 0);
    }

    #[test]
    fn receive_extend_consumes_exact_bits() {
        // 101 -> +5, then 010 -> -5, then padding.
        let mut reader = JpegBitReader::new(&[0b1010_1011, 0xFF, 0x00]);
        assert_eq!(receive_extend(&mut reader, 3).unwrap(), 5);
        assert_eq!(receive_extend(&mut reader, 3).unwrap(), -5);
        assert_eq!(receive_extend(&mut reader, 0).unwrap(), 0);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
    }
}
