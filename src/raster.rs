//! Decoded pixel raster.

pub const RGB_CHANNELS: usize = 3;

/// 8-bit RGB pixels, row-major, interleaved, no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// A black raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * RGB_CHANNELS],
        }
    }

    pub fn stride(&self) -> usize {
        self.width as usize * RGB_CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * RGB_CHANNELS;
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ])
    }

    pub fn as_rgb8(&self) -> &[u8] {
        &self.pixels
    }

    /// Expands to RGBA with an opaque alpha channel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(RGB_CHANNELS)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_lookup_and_bounds() {
        let mut raster = Raster::new(2, 2);
        raster.pixels[9..12].copy_from_slice(&[1, 2, 3]);
        assert_eq!(raster.pixel(1, 1), Some([1, 2, 3]));
        assert_eq!(raster.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(raster.pixel(2, 0), None);
        assert_eq!(raster.pixel(0, 2), None);
    }

    #[test]
    fn rgba_is_opaque() {
        let mut raster = Raster::new(1, 2);
        raster.pixels.copy_from_slice(&[10, 20, 30, 40, 50, 60]);
        assert_eq!(raster.to_rgba8(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
