//! Quantization tables, dequantization and the zigzag permutation.

use crate::jpeg1::dct::BLOCK_DIM;

/// Maps a zigzag sequence index to its row-major position in the 8x8 block.
pub const ZIGZAG_ORDER: [usize; BLOCK_DIM] = [
    0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// 64 quantizer steps in zigzag order, as transmitted in a DQT segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationTable {
    pub values: [u16; BLOCK_DIM],
}

impl QuantizationTable {
    pub fn new(values: [u16; BLOCK_DIM]) -> Self {
        Self { values }
    }
}

/// De-quantizes DCT coefficients. Both inputs are in zigzag order.
pub fn dequantize_block(
    coefficients: &[i32; BLOCK_DIM],
    table: &QuantizationTable,
    output: &mut [f32; BLOCK_DIM],
) {
    for i in 0..BLOCK_DIM {
        output[i] = coefficients[i] as f32 * table.values[i] as f32;
    }
}

/// Permutes a block from zigzag storage order into row-major order.
pub fn unzigzag<T: Copy + Default>(zigzag: &[T; BLOCK_DIM]) -> [T; BLOCK_DIM] {
    let mut natural = [T::default(); BLOCK_DIM];
    for (k, &value) in zigzag.iter().enumerate() {
        natural[ZIGZAG_ORDER[k]] = value;
    }
    natural
}
