//! Bitmap-to-tensor encoding for a fixed model input size.

use image::imageops::FilterType;
use image::RgbImage;

use crate::core::errors::RecognitionResult;
use crate::core::inference::{ImageTensor, NormScheme};
use crate::processors::normalization::PixelNormalizer;

/// Encodes RGB bitmaps into normalized square NCHW tensors.
///
/// One encoder per model input contract: the detector and the classifiers
/// differ in target size and in normalization scheme, and the pipeline holds
/// one of each.
#[derive(Debug, Clone)]
pub struct TensorEncoder {
    size: u32,
    scheme: NormScheme,
    normalizer: PixelNormalizer,
}

impl TensorEncoder {
    /// Encoder for the detector: `size`×`size`, byte channels rescaled to [0,1].
    pub fn detection(size: u32) -> Self {
        Self {
            size,
            scheme: NormScheme::Detection,
            normalizer: PixelNormalizer::detection(),
        }
    }

    /// Encoder for the classifiers: `size`×`size`, channels centered to [-1,1].
    pub fn classification(size: u32) -> Self {
        Self {
            size,
            scheme: NormScheme::Classification,
            normalizer: PixelNormalizer::classification(),
        }
    }

    /// Square side length this encoder produces.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resizes `img` to the fixed square and normalizes it channel-major.
    ///
    /// The resize ignores aspect ratio on purpose: the models were trained on
    /// squashed squares, so letterboxing here would shift their input
    /// distribution.
    pub fn encode(&self, img: &RgbImage) -> RecognitionResult<ImageTensor> {
        let data = if img.dimensions() == (self.size, self.size) {
            self.normalizer.normalize_to(img)?
        } else {
            let resized = image::imageops::resize(img, self.size, self.size, FilterType::Lanczos3);
            self.normalizer.normalize_to(&resized)?
        };
        Ok(ImageTensor::new(self.scheme, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_to_the_fixed_square() {
        let img = RgbImage::from_pixel(31, 17, image::Rgb([10, 20, 30]));
        let encoder = TensorEncoder::detection(8);
        let tensor = encoder.encode(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        assert_eq!(tensor.scheme(), NormScheme::Detection);
    }

    #[test]
    fn uniform_images_survive_the_resize_exactly() {
        // A constant image resamples to the same constant regardless of filter.
        let img = RgbImage::from_pixel(100, 50, image::Rgb([51, 102, 204]));
        let tensor = TensorEncoder::detection(16).encode(&img).unwrap();
        for &v in tensor.view().index_axis(ndarray::Axis(1), 0) {
            assert!((v - 51.0 / 255.0).abs() < 1e-3);
        }
        for &v in tensor.view().index_axis(ndarray::Axis(1), 2) {
            assert!((v - 204.0 / 255.0).abs() < 1e-3);
        }
    }

    #[test]
    fn classification_encoder_tags_its_scheme() {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        let tensor = TensorEncoder::classification(4).encode(&img).unwrap();
        assert_eq!(tensor.scheme(), NormScheme::Classification);
        // Black pixels center to -1.
        assert!((tensor.view()[[0, 0, 0, 0]] - (-1.0)).abs() < 1e-6);
    }
}
