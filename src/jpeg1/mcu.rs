//! MCU geometry, per-MCU entropy decoding and pixel reconstruction.
//!
//! Entropy decoding ([`decode_mcu`]) is strictly sequential. Reconstruction
//! ([`McuReconstructor::write_mcu`]) only reads shared tables and writes one
//! MCU's rectangle of the output, so MCUs can be reconstructed independently.

use crate::error::Result;
use crate::jpeg1::block_decoder::ScanDecoder;
use crate::jpeg1::color::ycbcr_to_rgb;
use crate::jpeg1::dct::{BLOCK_DIM, BLOCK_SIZE, idct_8x8_baseline};
use crate::jpeg1::huffman::{AC_TABLE_CLASS, DC_TABLE_CLASS, HuffmanTable};
use crate::jpeg1::quantization::{QuantizationTable, dequantize_block, unzigzag};
use crate::jpeg1::segments::{
    COMPONENT_COUNT, FrameComponent, FrameHeader, JpegTables, ScanComponent, ScanHeader,
};
use crate::raster::RGB_CHANNELS;

/// Coefficients of one block, zigzag order.
pub type CoefficientBlock = [i32; BLOCK_DIM];

/// MCU grid of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuLayout {
    pub image_width: usize,
    pub image_height: usize,
    pub max_horizontal_sampling: usize,
    pub max_vertical_sampling: usize,
    /// MCU extent in pixels.
    pub mcu_width: usize,
    pub mcu_height: usize,
    /// Number of MCUs per row and per column.
    pub mcus_x: usize,
    pub mcus_y: usize,
}

impl McuLayout {
    pub fn new(
        image_width: usize,
        image_height: usize,
        max_horizontal_sampling: usize,
        max_vertical_sampling: usize,
    ) -> Self {
        let mcu_width = max_horizontal_sampling * BLOCK_SIZE;
        let mcu_height = max_vertical_sampling * BLOCK_SIZE;
        Self {
            image_width,
            image_height,
            max_horizontal_sampling,
            max_vertical_sampling,
            mcu_width,
            mcu_height,
            mcus_x: image_width.div_ceil(mcu_width),
            mcus_y: image_height.div_ceil(mcu_height),
        }
    }

    pub fn from_frame(frame: &FrameHeader) -> Self {
        Self::new(
            frame.width as usize,
            frame.height as usize,
            frame.max_horizontal_sampling() as usize,
            frame.max_vertical_sampling() as usize,
        )
    }

    pub fn mcu_count(&self) -> usize {
        self.mcus_x * self.mcus_y
    }
}

struct ScanEntry<'t> {
    first_block: usize,
    blocks_per_mcu: usize,
    component_index: usize,
    dc_table: &'t HuffmanTable,
    ac_table: &'t HuffmanTable,
}

/// Huffman tables resolved once per scan, in scan order.
pub struct ScanTables<'t> {
    entries: [ScanEntry<'t>; COMPONENT_COUNT],
}

impl<'t> ScanTables<'t> {
    pub fn resolve(frame: &FrameHeader, scan: &ScanHeader, tables: &'t JpegTables) -> Result<Self> {
        let entry = |sc: &ScanComponent| -> Result<ScanEntry<'t>> {
            Ok(ScanEntry {
                first_block: frame.first_block(sc.component_index),
                blocks_per_mcu: frame.components[sc.component_index].blocks_per_mcu(),
                component_index: sc.component_index,
                dc_table: tables.huffman_table(DC_TABLE_CLASS, sc.dc_table_id)?,
                ac_table: tables.huffman_table(AC_TABLE_CLASS, sc.ac_table_id)?,
            })
        };
        let [first, second, third] = &scan.components;
        Ok(Self {
            entries: [entry(first)?, entry(second)?, entry(third)?],
        })
    }
}

/// Decodes every block of the next MCU, component by component in scan
/// order, into `mcu`. `mcu` holds [`FrameHeader::blocks_per_mcu`] blocks,
/// grouped in frame component order.
pub fn decode_mcu(
    decoder: &mut ScanDecoder,
    tables: &ScanTables,
    mcu: &mut [CoefficientBlock],
) -> Result<()> {
    for entry in &tables.entries {
        let blocks = &mut mcu[entry.first_block..entry.first_block + entry.blocks_per_mcu];
        for block in blocks {
            *block = decoder.decode_block(entry.component_index, entry.dc_table, entry.ac_table)?;
        }
    }
    Ok(())
}

/// Dequantize, un-zigzag and inverse-transform one block into row-major,
/// zero-centred samples.
pub fn reconstruct_block(
    coefficients: &CoefficientBlock,
    table: &QuantizationTable,
) -> [f32; BLOCK_DIM] {
    let mut dequantized = [0.0f32; BLOCK_DIM];
    dequantize_block(coefficients, table, &mut dequantized);
    let natural = unzigzag(&dequantized);
    let mut samples = [0.0f32; BLOCK_DIM];
    idct_8x8_baseline(&natural, &mut samples);
    samples
}

struct ComponentPlan<'t> {
    first_block: usize,
    horizontal_sampling: usize,
    vertical_sampling: usize,
    quantization: &'t QuantizationTable,
}

/// Turns decoded MCUs into RGB pixels.
pub struct McuReconstructor<'t> {
    layout: McuLayout,
    blocks_per_mcu: usize,
    components: [ComponentPlan<'t>; COMPONENT_COUNT],
}

impl<'t> McuReconstructor<'t> {
    pub fn new(frame: &FrameHeader, tables: &'t JpegTables) -> Result<Self> {
        let plan = |index: usize, component: &FrameComponent| -> Result<ComponentPlan<'t>> {
            Ok(ComponentPlan {
                first_block: frame.first_block(index),
                horizontal_sampling: component.horizontal_sampling as usize,
                vertical_sampling: component.vertical_sampling as usize,
                quantization: tables.quantization_table(component.quant_table_id)?,
            })
        };
        let [y, cb, cr] = &frame.components;
        Ok(Self {
            layout: McuLayout::from_frame(frame),
            blocks_per_mcu: frame.blocks_per_mcu(),
            components: [plan(0, y)?, plan(1, cb)?, plan(2, cr)?],
        })
    }

    pub fn layout(&self) -> &McuLayout {
        &self.layout
    }

    /// Coefficient blocks in one MCU, all components.
    pub fn blocks_per_mcu(&self) -> usize {
        self.blocks_per_mcu
    }

    /// Assembles the sample plane (`H*8` by `V*8`) of one component.
    fn component_plane(&self, component_index: usize, mcu: &[CoefficientBlock]) -> Vec<f32> {
        let plan = &self.components[component_index];
        let blocks = &mcu[plan.first_block
            ..plan.first_block + plan.horizontal_sampling * plan.vertical_sampling];
        let plane_width = plan.horizontal_sampling * BLOCK_SIZE;
        let mut plane = vec![0.0f32; plane_width * plan.vertical_sampling * BLOCK_SIZE];
        for (index, block) in blocks.iter().enumerate() {
            let block_x = index % plan.horizontal_sampling;
            let block_y = index / plan.horizontal_sampling;
            let samples = reconstruct_block(block, plan.quantization);
            for row in 0..BLOCK_SIZE {
                let start = (block_y * BLOCK_SIZE + row) * plane_width + block_x * BLOCK_SIZE;
                plane[start..start + BLOCK_SIZE]
                    .copy_from_slice(&samples[row * BLOCK_SIZE..(row + 1) * BLOCK_SIZE]);
            }
        }
        plane
    }

    /// Writes MCU column `mcu_x` into `strip`, the raster rows covered by the
    /// MCU's row. `mcu` holds the MCU's blocks as filled by [`decode_mcu`].
    /// `strip` may hold fewer rows than an MCU at the bottom edge; pixels
    /// right of the image width are dropped.
    pub fn write_mcu(&self, mcu: &[CoefficientBlock], mcu_x: usize, strip: &mut [u8]) {
        let layout = &self.layout;
        let stride = layout.image_width * RGB_CHANNELS;
        let rows = (strip.len() / stride).min(layout.mcu_height);
        let origin_x = mcu_x * layout.mcu_width;
        let columns = layout.mcu_width.min(layout.image_width.saturating_sub(origin_x));

        let planes: [Vec<f32>; COMPONENT_COUNT] =
            std::array::from_fn(|c| self.component_plane(c, mcu));

        for y in 0..rows {
            let row = &mut strip[y * stride..(y + 1) * stride];
            for x in 0..columns {
                let [luma, cb, cr]: [f32; COMPONENT_COUNT] = std::array::from_fn(|c| {
                    let plan = &self.components[c];
                    let plane_width = plan.horizontal_sampling * BLOCK_SIZE;
                    let sx = x * plan.horizontal_sampling / layout.max_horizontal_sampling;
                    let sy = y * plan.vertical_sampling / layout.max_vertical_sampling;
                    planes[c][sy * plane_width + sx]
                });
                let offset = (origin_x + x) * RGB_CHANNELS;
                row[offset..offset + RGB_CHANNELS].copy_from_slice(&ycbcr_to_rgb(luma, cb, cr));
            }
        }
    }
}
