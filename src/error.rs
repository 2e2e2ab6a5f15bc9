use thiserror::Error;

/// Coarse classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An unexpected byte where a stuffing byte or a marker was required.
    Framing,
    /// A structurally malformed or unsupported segment or entropy-coded block.
    Format,
    /// The stream ended before a required field could be read.
    Truncated,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegError {
    // Framing errors
    #[error("Start of image marker not found")]
    StartOfImageMarkerNotFound,
    #[error("JPEG marker start byte not found, found 0x{found:02X}")]
    JpegMarkerStartByteNotFound { found: u8 },
    #[error("Unexpected marker 0xFF{marker:02X} inside entropy-coded data")]
    UnexpectedMarkerInScan { marker: u8 },

    // Format errors
    #[error("Invalid marker segment size {size}")]
    InvalidMarkerSegmentSize { size: u16 },
    #[error("Invalid quantization table segment")]
    InvalidQuantizationTableSegment,
    #[error("Invalid quantization table precision {precision}")]
    InvalidQuantizationTablePrecision { precision: u8 },
    #[error("Invalid table id {id}")]
    InvalidTableId { id: u8 },
    #[error("Invalid Huffman table class {class}")]
    InvalidHuffmanTableClass { class: u8 },
    #[error("Invalid Huffman table segment")]
    InvalidHuffmanTableSegment,
    #[error("Huffman table declares {declared} symbols but only {available} are present")]
    HuffmanSymbolCountMismatch { declared: usize, available: usize },
    #[error("Huffman code does not fit in 16 bits")]
    HuffmanCodeTooLong,
    #[error("Invalid Huffman code in entropy-coded data")]
    InvalidHuffmanCode,
    #[error("AC coefficient index {index} out of range")]
    CoefficientIndexOutOfRange { index: usize },
    #[error("Invalid coefficient size {size}")]
    InvalidCoefficientSize { size: u8 },
    #[error("DC predictor of component {component} out of range")]
    DcPredictorOverflow { component: usize },
    #[error("Unsupported sample precision {precision}")]
    UnsupportedPrecision { precision: u8 },
    #[error("Unsupported component count {count}")]
    UnsupportedComponentCount { count: u8 },
    #[error("Invalid sampling factor {horizontal}x{vertical}")]
    InvalidSamplingFactor { horizontal: u8, vertical: u8 },
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },
    #[error("Image of {pixels} pixels exceeds the limit of {limit}")]
    ImageTooLarge { pixels: usize, limit: usize },
    #[error("Unsupported frame type 0xFF{marker:02X}")]
    UnsupportedFrameType { marker: u8 },
    #[error("Duplicate component id {id}")]
    DuplicateComponentId { id: u8 },
    #[error("Duplicate start of frame marker")]
    DuplicateStartOfFrameMarker,
    #[error("Start of scan before start of frame")]
    StartOfFrameMarkerNotFound,
    #[error("More than one scan is not supported")]
    UnexpectedStartOfScanMarker,
    #[error("No scan found before end of image")]
    StartOfScanMarkerNotFound,
    #[error("Unknown component id {id}")]
    UnknownComponentId { id: u8 },
    #[error("Quantization table {id} referenced but not defined")]
    MissingQuantizationTable { id: u8 },
    #[error("Huffman table {class}/{id} referenced but not defined")]
    MissingHuffmanTable { class: u8, id: u8 },

    // Truncation errors
    #[error("Unexpected end of data")]
    UnexpectedEndOfData,
    #[error("End of image marker not found")]
    EndOfImageMarkerNotFound,
}

impl JpegError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StartOfImageMarkerNotFound
            | Self::JpegMarkerStartByteNotFound { .. }
            | Self::UnexpectedMarkerInScan { .. } => ErrorKind::Framing,
            Self::UnexpectedEndOfData | Self::EndOfImageMarkerNotFound => ErrorKind::Truncated,
            _ => ErrorKind::Format,
        }
    }
}

pub type Result<T> = std::result::Result<T, JpegError>;
