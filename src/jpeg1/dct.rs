//! Inverse Discrete Cosine Transform for 8x8 blocks (ITU-T T.81 A.3.3).

use std::f32::consts::{FRAC_1_SQRT_2, PI};

pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_DIM: usize = BLOCK_SIZE * BLOCK_SIZE;

fn scale(frequency: usize) -> f32 {
    if frequency == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

/// Direct inverse DCT. Input and output are row-major; `input[v * 8 + u]`
/// holds vertical frequency `v` and horizontal frequency `u`. Output samples
/// are zero-centred (no level shift).
pub fn idct_8x8_baseline(input: &[f32; BLOCK_DIM], output: &mut [f32; BLOCK_DIM]) {
    for y in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            let mut sum = 0.0f32;
            for v in 0..BLOCK_SIZE {
                for u in 0..BLOCK_SIZE {
                    let cos_x = ((((2 * x + 1) * u) as f32 * PI) / 16.0).cos();
                    let cos_y = ((((2 * y + 1) * v) as f32 * PI) / 16.0).cos();
                    sum += scale(u) * scale(v) * input[v * BLOCK_SIZE + u] * cos_x * cos_y;
                }
            }
            output[y * BLOCK_SIZE + x] = 0.25 * sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fdct_8x8(input: &[f32; BLOCK_DIM], output: &mut [f32; BLOCK_DIM]) {
        for v in 0..BLOCK_SIZE {
            for u in 0..BLOCK_SIZE {
                let mut sum = 0.0f32;
                for y in 0..BLOCK_SIZE {
                    for x in 0..BLOCK_SIZE {
                        let cos_x = ((((2 * x + 1) * u) as f32 * PI) / 16.0).cos();
                        let cos_y = ((((2 * y + 1) * v) as f32 * PI) / 16.0).cos();
                        sum += input[y * BLOCK_SIZE + x] * cos_x * cos_y;
                    }
                }
                output[v * BLOCK_SIZE + u] = 0.25 * scale(u) * scale(v) * sum;
            }
        }
    }

    #[test]
    fn dc_only_block_is_constant() {
        for dc in [-1024.0f32, -8.0, 0.0, 80.0, 1016.0] {
            let mut input = [0.0f32; BLOCK_DIM];
            input[0] = dc;
            let mut output = [0.0f32; BLOCK_DIM];
            idct_8x8_baseline(&input, &mut output);
            for sample in output {
                assert!((sample - dc / 8.0).abs() < 1e-3, "{sample} vs {}", dc / 8.0);
            }
        }
    }

    #[test]
    fn fdct_idct_round_trip() {
        let input: [f32; BLOCK_DIM] = std::array::from_fn(|i| ((i * 37) % 255) as f32 - 128.0);
        let mut coefficients = [0.0f32; BLOCK_DIM];
        fdct_8x8(&input, &mut coefficients);

        let mut output = [0.0f32; BLOCK_DIM];
        idct_8x8_baseline(&coefficients, &mut output);

        for i in 0..BLOCK_DIM {
            assert!(
                (input[i] - output[i]).abs() < 0.1,
                "Mismatch at {}: {} vs {}",
                i,
                input[i],
                output[i]
            );
        }
    }

    #[test]
    fn horizontal_frequency_varies_along_rows() {
        let mut input = [0.0f32; BLOCK_DIM];
        input[1] = 100.0;
        let mut output = [0.0f32; BLOCK_DIM];
        idct_8x8_baseline(&input, &mut output);
        // Every row is identical; values fall from left to right.
        for y in 1..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                assert!((output[y * BLOCK_SIZE + x] - output[x]).abs() < 1e-3);
            }
        }
        assert!(output[0] > 0.0 && output[7] < 0.0);
    }
}
