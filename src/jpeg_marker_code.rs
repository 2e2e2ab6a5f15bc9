use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF0: Baseline DCT, Huffman coding.
    StartOfFrameBaseline = 0xC0,
    /// SOF1: Extended sequential DCT, Huffman coding.
    StartOfFrameExtendedSequential = 0xC1,
    /// SOF2: Progressive DCT, Huffman coding.
    StartOfFrameProgressive = 0xC2,
    /// SOF3: Lossless (sequential), Huffman coding.
    StartOfFrameLossless = 0xC3,

    /// DHT: Defines one or more Huffman tables.
    DefineHuffmanTable = 0xC4,

    /// SOF5..SOF7: Differential (hierarchical) frames, Huffman coding.
    StartOfFrameDifferentialSequential = 0xC5,
    StartOfFrameDifferentialProgressive = 0xC6,
    StartOfFrameDifferentialLossless = 0xC7,

    /// JPG: Reserved for JPEG extensions.
    JpegExtension = 0xC8,

    /// SOF9..SOF11: Arithmetic coding.
    StartOfFrameExtendedSequentialArithmetic = 0xC9,
    StartOfFrameProgressiveArithmetic = 0xCA,
    StartOfFrameLosslessArithmetic = 0xCB,

    /// DAC: Defines arithmetic coding conditioning.
    DefineArithmeticCoding = 0xCC,

    /// SOF13..SOF15: Differential frames, arithmetic coding.
    StartOfFrameDifferentialSequentialArithmetic = 0xCD,
    StartOfFrameDifferentialProgressiveArithmetic = 0xCE,
    StartOfFrameDifferentialLosslessArithmetic = 0xCF,

    /// RST0..RST7: Restart markers.
    Restart0 = 0xD0,
    Restart1 = 0xD1,
    Restart2 = 0xD2,
    Restart3 = 0xD3,
    Restart4 = 0xD4,
    Restart5 = 0xD5,
    Restart6 = 0xD6,
    Restart7 = 0xD7,

    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,
    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,
    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,
    /// DQT: Defines one or more quantization tables.
    DefineQuantizationTable = 0xDB,
    /// DNL: Defines the number of lines in a scan.
    DefineNumberOfLines = 0xDC,
    /// DRI: Defines the restart interval used in succeeding scans.
    DefineRestartInterval = 0xDD,

    /// APP0: Application data 0: used for JFIF header.
    ApplicationData0 = 0xE0,
    /// APP1: Application data 1: used for EXIF or XMP header.
    ApplicationData1 = 0xE1,
    /// APP2: Application data 2: used for ICC profile.
    ApplicationData2 = 0xE2,
    ApplicationData3 = 0xE3,
    ApplicationData4 = 0xE4,
    ApplicationData5 = 0xE5,
    ApplicationData6 = 0xE6,
    ApplicationData7 = 0xE7,
    ApplicationData8 = 0xE8,
    ApplicationData9 = 0xE9,
    ApplicationData10 = 0xEA,
    ApplicationData11 = 0xEB,
    ApplicationData12 = 0xEC,
    ApplicationData13 = 0xED,
    /// APP14: Application data 14: used by Adobe
    ApplicationData14 = 0xEE,
    ApplicationData15 = 0xEF,

    /// COM: Comment block.
    Comment = 0xFE,
}

impl JpegMarkerCode {
    /// True for every SOFn marker other than baseline.
    pub fn is_unsupported_start_of_frame(self) -> bool {
        matches!(
            self,
            Self::StartOfFrameExtendedSequential
                | Self::StartOfFrameProgressive
                | Self::StartOfFrameLossless
                | Self::StartOfFrameDifferentialSequential
                | Self::StartOfFrameDifferentialProgressive
                | Self::StartOfFrameDifferentialLossless
                | Self::StartOfFrameExtendedSequentialArithmetic
                | Self::StartOfFrameProgressiveArithmetic
                | Self::StartOfFrameLosslessArithmetic
                | Self::StartOfFrameDifferentialSequentialArithmetic
                | Self::StartOfFrameDifferentialProgressiveArithmetic
                | Self::StartOfFrameDifferentialLosslessArithmetic
        )
    }

    /// Standalone markers carry no length field.
    pub fn is_standalone(self) -> bool {
        matches!(
            self,
            Self::StartOfImage
                | Self::EndOfImage
                | Self::Restart0
                | Self::Restart1
                | Self::Restart2
                | Self::Restart3
                | Self::Restart4
                | Self::Restart5
                | Self::Restart6
                | Self::Restart7
        )
    }
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_STUFFING_BYTE: u8 = 0x00;

// The size in bytes of the segment length field.
pub const SEGMENT_LENGTH_SIZE: usize = 2;
