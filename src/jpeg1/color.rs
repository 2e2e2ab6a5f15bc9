//! YCbCr to RGB conversion (JFIF / ITU-R BT.601 full range).

const LEVEL_SHIFT: f32 = 128.0;

/// Converts zero-centred IDCT output samples to an 8-bit RGB triple.
#[inline]
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> [u8; 3] {
    let r = y + 1.402 * cr + LEVEL_SHIFT;
    let g = y - 0.344136 * cb - 0.714136 * cr + LEVEL_SHIFT;
    let b = y + 1.772 * cb + LEVEL_SHIFT;
    [clamp_to_u8(r), clamp_to_u8(g), clamp_to_u8(b)]
}

#[inline]
fn clamp_to_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_chroma_is_gray() {
        assert_eq!(ycbcr_to_rgb(0.0, 0.0, 0.0), [128, 128, 128]);
        assert_eq!(ycbcr_to_rgb(-28.0, 0.0, 0.0), [100, 100, 100]);
    }

    #[test]
    fn channels_are_clamped() {
        assert_eq!(ycbcr_to_rgb(500.0, 0.0, 0.0), [255, 255, 255]);
        assert_eq!(ycbcr_to_rgb(-500.0, 0.0, 0.0), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb(0.0, 0.0, 127.0), [255, 37, 128]);
    }

    #[test]
    fn blue_difference_drives_blue() {
        let [r, g, b] = ycbcr_to_rgb(0.0, 50.0, 0.0);
        assert_eq!(r, 128);
        assert_eq!(g, 110);
        assert_eq!(b, 216);
    }
}
