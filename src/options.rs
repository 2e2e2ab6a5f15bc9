/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail decoding frames with more than this number of pixels, checked
    /// before the output raster is allocated.
    pub pixel_limit: Option<usize>,
    /// When false, a stream that ends right after the scan without an EOI
    /// marker still decodes.
    pub require_end_of_image: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            pixel_limit: Some(1 << 28),
            require_end_of_image: true,
        }
    }
}
