//! Baseline JPEG decoder.
//!
//! ```no_run
//! let data = std::fs::read("photo.jpg").unwrap();
//! let raster = jpegdec_rs::decode(&data).unwrap();
//! println!("{}x{}", raster.width, raster.height);
//! ```

pub mod error;
pub mod jpeg1;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod options;
pub mod raster;

pub use error::{ErrorKind, JpegError};
pub use jpeg1::Jpeg1Decoder;
pub use jpeg1::segments::{FrameComponent, FrameHeader};
pub use options::DecodeOptions;
pub use raster::Raster;

/// Decodes a complete baseline JPEG stream with default options.
pub fn decode(source: &[u8]) -> error::Result<Raster> {
    Jpeg1Decoder::new(source).decode()
}
