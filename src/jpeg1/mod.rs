//! JPEG 1 (Baseline) Implementation (ISO/IEC 10918-1 / ITU-T T.81)
//!
//! This module implements the baseline sequential DCT process.
//!
//! Features:
//! - 8-bit YCbCr images with three components in a single interleaved scan.
//! - Huffman coding with tables defined in the stream.
//! - Any sampling factors from 1 to 4, upsampled by pixel replication.
//!
//! Progressive, hierarchical, lossless and arithmetic-coded frames, restart
//! markers and 12-bit precision are not supported.

pub mod bit_reader;
pub mod block_decoder;
pub mod color;
pub mod dct;
pub mod decoder;
pub mod huffman;
pub mod mcu;
pub mod quantization;
pub mod segments;

pub use decoder::Jpeg1Decoder;
