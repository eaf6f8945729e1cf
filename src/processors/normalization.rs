//! Pixel normalization for model input tensors.
//!
//! Both models consume NCHW float batches; they differ only in the affine
//! map applied per channel. The map is folded into `alpha = scale / std` and
//! `beta = -mean / std` so the hot loop is one multiply-add per value.

use image::RgbImage;
use ndarray::Array4;

use crate::core::errors::{RecognitionError, RecognitionResult};

/// Per-channel affine normalization producing channel-first float data.
#[derive(Debug, Clone)]
pub struct PixelNormalizer {
    /// Scaling factor per channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset per channel (beta = -mean / std).
    beta: [f32; 3],
}

impl PixelNormalizer {
    /// Creates a normalizer from scale, per-channel mean, and per-channel std.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `scale` is not positive or any
    /// std value is not positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> RecognitionResult<Self> {
        if scale <= 0.0 {
            return Err(RecognitionError::config("scale must be greater than 0"));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(RecognitionError::config(format!(
                    "std at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }
        Ok(Self { alpha, beta })
    }

    /// Plain byte-to-[0,1] rescale, the detector's scheme.
    pub fn detection() -> Self {
        Self {
            alpha: [1.0 / 255.0; 3],
            beta: [0.0; 3],
        }
    }

    /// Rescale then center to [-1,1] with mean 0.5 and std 0.5, the
    /// classifiers' scheme.
    pub fn classification() -> Self {
        Self {
            alpha: [2.0 / 255.0; 3],
            beta: [-1.0; 3],
        }
    }

    /// Normalizes one RGB image into a `[1, 3, H, W]` batch.
    ///
    /// Traversal is channel-major: all red values, then all green, then all
    /// blue, matching what the models were trained on.
    pub fn normalize_to(&self, img: &RgbImage) -> RecognitionResult<Array4<f32>> {
        let (width, height) = img.dimensions();
        let mut result = vec![0.0f32; (3 * height * width) as usize];

        for c in 0..3u32 {
            for y in 0..height {
                for x in 0..width {
                    let value = img.get_pixel(x, y)[c as usize] as f32;
                    let dst_idx = (c * height * width + y * width + x) as usize;
                    result[dst_idx] = value * self.alpha[c as usize] + self.beta[c as usize];
                }
            }
        }

        Ok(Array4::from_shape_vec(
            (1, 3, height as usize, width as usize),
            result,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_scheme_maps_bytes_to_unit_range() {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 128]));
        let tensor = PixelNormalizer::detection().normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 1, 1]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] - 0.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 0]] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn classification_scheme_centers_to_signed_unit_range() {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 128]));
        let tensor = PixelNormalizer::classification().normalize_to(&img).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] - (-1.0)).abs() < 1e-6);
        // (128/255 - 0.5) / 0.5
        assert!((tensor[[0, 2, 0, 0]] - 0.003_921_6).abs() < 1e-4);
    }

    #[test]
    fn traversal_is_channel_major() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        let tensor = PixelNormalizer::detection().normalize_to(&img).unwrap();

        // All-red then all-green then all-blue.
        let flat: Vec<f32> = tensor.iter().copied().collect();
        assert_eq!(flat, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn custom_parameters_are_validated() {
        assert!(PixelNormalizer::new(0.0, [0.0; 3], [1.0; 3]).is_err());
        assert!(PixelNormalizer::new(1.0, [0.0; 3], [1.0, 0.0, 1.0]).is_err());
        assert!(PixelNormalizer::new(1.0 / 255.0, [0.5; 3], [0.5; 3]).is_ok());
    }
}
