//! JPEG 1 Baseline Decoder implementation.

use crate::error::{JpegError, Result};
use crate::jpeg_marker_code::JpegMarkerCode;
use crate::jpeg_stream_reader::JpegStreamReader;
use crate::jpeg1::block_decoder::ScanDecoder;
use crate::jpeg1::dct::BLOCK_DIM;
use crate::jpeg1::mcu::{CoefficientBlock, McuReconstructor, ScanTables, decode_mcu};
use crate::jpeg1::segments::{
    FrameHeader, JpegTables, ScanHeader, parse_dht, parse_dqt, parse_sof, parse_sos,
};
use crate::options::DecodeOptions;
use crate::raster::Raster;
use tracing::{debug, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Segments the decoder has to act on; tables and unknown segments are
/// handled while looking for the next one.
enum FrameSegment<'a> {
    StartOfFrame(&'a [u8]),
    StartOfScan(&'a [u8]),
    EndOfImage,
}

pub struct Jpeg1Decoder<'a> {
    reader: JpegStreamReader<'a>,
    options: DecodeOptions,
    tables: JpegTables,
    frame: Option<FrameHeader>,
}

impl<'a> Jpeg1Decoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self::with_options(source, DecodeOptions::default())
    }

    pub fn with_options(source: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            reader: JpegStreamReader::new(source),
            options,
            tables: JpegTables::default(),
            frame: None,
        }
    }

    pub fn frame_header(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    pub fn tables(&self) -> &JpegTables {
        &self.tables
    }

    /// Reads segments up to and including the frame header.
    pub fn read_header(&mut self) -> Result<FrameHeader> {
        if let Some(frame) = self.frame {
            return Ok(frame);
        }
        self.read_start_of_image()?;

        match self.next_segment()? {
            Some(FrameSegment::StartOfFrame(payload)) => {
                let frame = parse_sof(payload)?;
                self.check_pixel_limit(&frame)?;
                self.frame = Some(frame);
                Ok(frame)
            }
            Some(FrameSegment::StartOfScan(_)) | Some(FrameSegment::EndOfImage) => {
                Err(JpegError::StartOfFrameMarkerNotFound)
            }
            None => Err(JpegError::UnexpectedEndOfData),
        }
    }

    /// Decodes the image. Reads the header first if that has not happened yet.
    pub fn decode(&mut self) -> Result<Raster> {
        let frame = self.read_header()?;
        let mut raster = None;

        loop {
            match self.next_segment()? {
                Some(FrameSegment::StartOfFrame(_)) => {
                    return Err(JpegError::DuplicateStartOfFrameMarker);
                }
                Some(FrameSegment::StartOfScan(payload)) => {
                    if raster.is_some() {
                        return Err(JpegError::UnexpectedStartOfScanMarker);
                    }
                    let scan = parse_sos(payload, &frame)?;
                    raster = Some(self.decode_scan(&frame, &scan)?);
                }
                Some(FrameSegment::EndOfImage) => {
                    if !self.reader.is_empty() {
                        warn!(
                            trailing_bytes = self.reader.remaining_len(),
                            "ignoring data after end of image"
                        );
                    }
                    return raster.ok_or(JpegError::StartOfScanMarkerNotFound);
                }
                None => {
                    return match raster {
                        Some(raster) if !self.options.require_end_of_image => {
                            warn!("end of image marker missing");
                            Ok(raster)
                        }
                        Some(_) => Err(JpegError::EndOfImageMarkerNotFound),
                        None => Err(JpegError::UnexpectedEndOfData),
                    };
                }
            }
        }
    }

    fn read_start_of_image(&mut self) -> Result<()> {
        match self.reader.read_marker() {
            Ok(code) if code == u8::from(JpegMarkerCode::StartOfImage) => Ok(()),
            Ok(_) | Err(JpegError::JpegMarkerStartByteNotFound { .. }) => {
                Err(JpegError::StartOfImageMarkerNotFound)
            }
            Err(e) => Err(e),
        }
    }

    fn check_pixel_limit(&self, frame: &FrameHeader) -> Result<()> {
        let pixels = frame.width as usize * frame.height as usize;
        match self.options.pixel_limit {
            Some(limit) if pixels > limit => Err(JpegError::ImageTooLarge { pixels, limit }),
            _ => Ok(()),
        }
    }

    /// Walks markers, interpreting table segments and skipping everything
    /// else, until a frame header, scan header or EOI. `None` at end of input.
    fn next_segment(&mut self) -> Result<Option<FrameSegment<'a>>> {
        loop {
            if self.reader.is_empty() {
                return Ok(None);
            }
            let code = self.reader.read_marker()?;
            match JpegMarkerCode::try_from(code) {
                Ok(JpegMarkerCode::StartOfFrameBaseline) => {
                    return Ok(Some(FrameSegment::StartOfFrame(
                        self.reader.read_segment_payload()?,
                    )));
                }
                Ok(JpegMarkerCode::StartOfScan) => {
                    return Ok(Some(FrameSegment::StartOfScan(
                        self.reader.read_segment_payload()?,
                    )));
                }
                Ok(JpegMarkerCode::EndOfImage) => return Ok(Some(FrameSegment::EndOfImage)),
                Ok(JpegMarkerCode::DefineQuantizationTable) => {
                    let payload = self.reader.read_segment_payload()?;
                    parse_dqt(payload, &mut self.tables)?;
                }
                Ok(JpegMarkerCode::DefineHuffmanTable) => {
                    let payload = self.reader.read_segment_payload()?;
                    parse_dht(payload, &mut self.tables)?;
                }
                Ok(marker) if marker.is_unsupported_start_of_frame() => {
                    return Err(JpegError::UnsupportedFrameType { marker: code });
                }
                Ok(marker) if marker.is_standalone() => {
                    trace!(?marker, "skipping standalone marker");
                }
                Ok(marker) => {
                    trace!(?marker, "skipping segment");
                    self.reader.skip_segment()?;
                }
                Err(_) => {
                    trace!(code, "skipping unknown segment");
                    self.reader.skip_segment()?;
                }
            }
        }
    }

    /// Frame driver. MCU rows are entropy-decoded a window at a time into a
    /// reused coefficient buffer; each window is then reconstructed into its
    /// disjoint strips of the raster before the next one is decoded.
    fn decode_scan(&mut self, frame: &FrameHeader, scan: &ScanHeader) -> Result<Raster> {
        let scan_tables = ScanTables::resolve(frame, scan, &self.tables)?;
        let reconstructor = McuReconstructor::new(frame, &self.tables)?;
        let layout = *reconstructor.layout();
        let blocks_per_mcu = reconstructor.blocks_per_mcu();
        let window_rows = reconstruction_window().clamp(1, layout.mcus_y);
        debug!(
            mcus_x = layout.mcus_x,
            mcus_y = layout.mcus_y,
            mcu_width = layout.mcu_width,
            mcu_height = layout.mcu_height,
            blocks_per_mcu,
            window_rows,
            "decoding scan"
        );

        let mut raster = Raster::new(frame.width as u32, frame.height as u32);
        let strip_len = layout.mcu_height * raster.stride();
        let row_blocks = layout.mcus_x * blocks_per_mcu;
        let mut coefficients = vec![[0i32; BLOCK_DIM]; window_rows * row_blocks];

        let mut decoder = ScanDecoder::new(self.reader.remaining_data());
        let windows = raster.pixels.chunks_mut(window_rows * strip_len);
        for (window, pixels) in windows.enumerate() {
            let rows = pixels.len().div_ceil(strip_len);
            let blocks = &mut coefficients[..rows * row_blocks];
            for mcu in blocks.chunks_exact_mut(blocks_per_mcu) {
                decode_mcu(&mut decoder, &scan_tables, mcu)?;
            }
            trace!(first_row = window * window_rows, rows, "entropy-decoded MCU rows");
            reconstruct_rows(&reconstructor, blocks, row_blocks, pixels, strip_len);
        }

        let consumed = decoder.position();
        self.reader.advance(consumed)?;
        debug!(bytes = consumed, "entropy-coded data consumed");
        Ok(raster)
    }
}

/// MCU rows decoded ahead of reconstruction.
#[cfg(feature = "parallel")]
fn reconstruction_window() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
fn reconstruction_window() -> usize {
    1
}

/// Reconstructs one raster strip per MCU row. `coefficients` holds
/// `row_blocks` blocks per MCU row.
#[cfg(feature = "parallel")]
fn reconstruct_rows(
    reconstructor: &McuReconstructor,
    coefficients: &[CoefficientBlock],
    row_blocks: usize,
    pixels: &mut [u8],
    strip_len: usize,
) {
    pixels
        .par_chunks_mut(strip_len)
        .zip(coefficients.par_chunks(row_blocks))
        .for_each(|(strip, row)| reconstruct_strip(reconstructor, row, strip));
}

#[cfg(not(feature = "parallel"))]
fn reconstruct_rows(
    reconstructor: &McuReconstructor,
    coefficients: &[CoefficientBlock],
    row_blocks: usize,
    pixels: &mut [u8],
    strip_len: usize,
) {
    for (strip, row) in pixels.chunks_mut(strip_len).zip(coefficients.chunks(row_blocks)) {
        reconstruct_strip(reconstructor, row, strip);
    }
}

fn reconstruct_strip(reconstructor: &McuReconstructor, row: &[CoefficientBlock], strip: &mut [u8]) {
    let mcus = row.chunks_exact(reconstructor.blocks_per_mcu());
    for (mcu_x, mcu) in mcus.enumerate() {
        reconstructor.write_mcu(mcu, mcu_x, strip);
    }
}
