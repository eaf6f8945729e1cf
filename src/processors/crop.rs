//! Projects detector boxes back onto the source image and cuts the region.
//!
//! Detection runs on a squashed square, so a box has to be scaled by the
//! original image's width and height independently before any pixels are
//! read. The projected rectangle is then padded on every side to give the
//! classifier some context around the package edge.

use image::RgbImage;
use tracing::debug;

use crate::core::constants::{CROP_PADDING_RATIO, DETECTION_INPUT_SIZE};
use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::processors::geometry::{BoundingBox, CropRegion};

/// Maps input-space boxes to padded pixel regions of the original image.
#[derive(Debug, Clone)]
pub struct RegionCropper {
    input_size: f32,
    padding: f32,
}

impl Default for RegionCropper {
    fn default() -> Self {
        Self::new(DETECTION_INPUT_SIZE, CROP_PADDING_RATIO)
    }
}

impl RegionCropper {
    /// Creates a cropper for the given detector input side length and
    /// per-side padding ratio.
    pub fn new(input_size: u32, padding: f32) -> Self {
        Self {
            input_size: input_size as f32,
            padding,
        }
    }

    /// Projects an input-space box onto an `original_width` x
    /// `original_height` image and pads it.
    ///
    /// Rejects boxes that lie outside the detector's input square and
    /// projections that land outside the image. The returned region is
    /// always at least 1x1 and contained in the image.
    pub fn project(
        &self,
        bbox: &BoundingBox,
        original_width: u32,
        original_height: u32,
    ) -> RecognitionResult<CropRegion> {
        if bbox.x < 0.0
            || bbox.y < 0.0
            || bbox.width <= 0.0
            || bbox.height <= 0.0
            || bbox.x > self.input_size
            || bbox.y > self.input_size
            || bbox.width > self.input_size
            || bbox.height > self.input_size
        {
            return Err(RecognitionError::invalid_input(format!(
                "detection box out of range: x={} y={} w={} h={} for input size {}",
                bbox.x, bbox.y, bbox.width, bbox.height, self.input_size
            )));
        }

        let width = original_width as i64;
        let height = original_height as i64;
        let scale_x = original_width as f32 / self.input_size;
        let scale_y = original_height as f32 / self.input_size;

        let mut x = ((bbox.x * scale_x) as i64).max(0);
        let mut y = ((bbox.y * scale_y) as i64).max(0);
        let mut w = ((bbox.width * scale_x) as i64).max(1);
        let mut h = ((bbox.height * scale_y) as i64).max(1);

        if x + w > width {
            w = width - x;
        }
        if y + h > height {
            h = height - y;
        }
        if w <= 0 || h <= 0 || x >= width || y >= height {
            return Err(RecognitionError::invalid_input(format!(
                "projected crop region is empty: x={x} y={y} w={w} h={h} on {original_width}x{original_height}"
            )));
        }

        let pad_x = ((w as f32 * self.padding) as i64).max(1);
        let pad_y = ((h as f32 * self.padding) as i64).max(1);
        x = (x - pad_x).max(0);
        y = (y - pad_y).max(0);
        w = (w + 2 * pad_x).max(1);
        h = (h + 2 * pad_y).max(1);

        if x + w > width {
            w = width - x;
        }
        if y + h > height {
            h = height - y;
        }
        if w <= 0 || h <= 0 || x >= width || y >= height {
            return Err(RecognitionError::invalid_input(format!(
                "padded crop region is empty: x={x} y={y} w={w} h={h} on {original_width}x{original_height}"
            )));
        }

        let region = CropRegion::new(x as u32, y as u32, w as u32, h as u32);
        debug!(
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "crop region projected"
        );
        Ok(region)
    }

    /// Projects `bbox` onto `image` and copies the region out.
    pub fn crop(
        &self,
        image: &RgbImage,
        bbox: &BoundingBox,
    ) -> RecognitionResult<(RgbImage, CropRegion)> {
        let region = self.project(bbox, image.width(), image.height())?;
        let view =
            image::imageops::crop_imm(image, region.x, region.y, region.width, region.height);
        Ok((view.to_image(), region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(x, y, width, height, 0.9)
    }

    #[test]
    fn full_frame_box_covers_a_portrait_image() {
        let cropper = RegionCropper::default();
        let region = cropper.project(&bbox(0.0, 0.0, 640.0, 640.0), 1000, 2000).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 1000, 2000));
    }

    #[test]
    fn padding_expands_the_region_on_every_side() {
        let cropper = RegionCropper::default();
        // Identity scale: 640x640 image.
        let region = cropper.project(&bbox(100.0, 100.0, 200.0, 100.0), 640, 640).unwrap();
        assert_eq!(region, CropRegion::new(80, 90, 240, 120));
    }

    #[test]
    fn padding_is_at_least_one_pixel() {
        let cropper = RegionCropper::default();
        let region = cropper.project(&bbox(320.0, 320.0, 2.0, 2.0), 640, 640).unwrap();
        assert_eq!(region, CropRegion::new(319, 319, 4, 4));
    }

    #[test]
    fn regions_stay_inside_the_image() {
        let cropper = RegionCropper::default();
        let cases = [
            (bbox(0.0, 0.0, 640.0, 640.0), 320, 240),
            (bbox(600.0, 600.0, 40.0, 40.0), 1000, 2000),
            (bbox(0.0, 0.0, 1.0, 1.0), 4032, 3024),
            (bbox(639.0, 0.5, 1.0, 639.0), 100, 100),
        ];
        for (input, width, height) in cases {
            let region = cropper.project(&input, width, height).unwrap();
            assert!(region.width >= 1 && region.height >= 1, "box {input:?}");
            assert!(region.right() <= width, "box {input:?}");
            assert!(region.bottom() <= height, "box {input:?}");
        }
    }

    #[test]
    fn out_of_range_boxes_are_rejected() {
        let cropper = RegionCropper::default();
        let invalid = [
            bbox(-1.0, 0.0, 10.0, 10.0),
            bbox(0.0, -0.5, 10.0, 10.0),
            bbox(0.0, 0.0, 0.0, 10.0),
            bbox(0.0, 0.0, 10.0, -2.0),
            bbox(641.0, 0.0, 10.0, 10.0),
            bbox(0.0, 0.0, 640.5, 10.0),
        ];
        for input in invalid {
            let result = cropper.project(&input, 1000, 1000);
            assert!(
                matches!(result, Err(RecognitionError::InvalidInput { .. })),
                "box {input:?}"
            );
        }
    }

    #[test]
    fn projection_past_the_right_edge_is_rejected() {
        let cropper = RegionCropper::default();
        // x equal to the input size passes the range check but projects onto
        // the first pixel past the image.
        let result = cropper.project(&bbox(640.0, 0.0, 1.0, 1.0), 100, 100);
        assert!(matches!(result, Err(RecognitionError::InvalidInput { .. })));
    }

    #[test]
    fn crop_copies_the_projected_pixels() {
        let cropper = RegionCropper::new(640, 0.1);
        // 640x640 image, red inside rows 90..210 and columns 80..320.
        let image = RgbImage::from_fn(640, 640, |x, y| {
            if (80..320).contains(&x) && (90..210).contains(&y) {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let (cropped, region) = cropper.crop(&image, &bbox(100.0, 100.0, 200.0, 100.0)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (region.width, region.height));
        assert_eq!(region, CropRegion::new(80, 90, 240, 120));
        assert_eq!(cropped.get_pixel(0, 0), &image::Rgb([255, 0, 0]));
        assert_eq!(cropped.get_pixel(239, 119), &image::Rgb([255, 0, 0]));
    }
}
