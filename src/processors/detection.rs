//! Decodes the detector's raw output grid into at most one bounding box.
//!
//! The detection head packs, for each of N candidate anchors, 4 box values
//! (center-x, center-y, width, height) followed by one score per class.
//! There is no separate objectness term; a candidate's confidence is its
//! highest class score. Selection is best-of-N rather than non-maximum
//! suppression: downstream cropping and classification assume zero or one
//! detections per frame, so a frame with several true detections yields
//! only the strongest.

use tracing::{debug, warn};

use crate::core::constants::{CONFIDENCE_THRESHOLD, DETECTION_INPUT_SIZE};
use crate::core::inference::TensorOutput;
use crate::processors::geometry::BoundingBox;

/// Decoder for a YOLO-style detection head.
#[derive(Debug, Clone)]
pub struct DetectionDecoder {
    input_size: f32,
    threshold: f32,
}

impl Default for DetectionDecoder {
    fn default() -> Self {
        Self::new(DETECTION_INPUT_SIZE, CONFIDENCE_THRESHOLD)
    }
}

impl DetectionDecoder {
    /// Creates a decoder for the given input side length and score threshold.
    pub fn new(input_size: u32, threshold: f32) -> Self {
        Self {
            input_size: input_size as f32,
            threshold,
        }
    }

    /// Decodes a raw detector output into the single best box.
    ///
    /// The tensor must be rank 3 with a leading batch dimension of 1. Both
    /// export layouts are accepted: `[1, N, 4+C]` with one candidate's values
    /// contiguous, and `[1, 4+C, N]` with one value-type contiguous across
    /// candidates. Orientation is decided by comparing the two trailing
    /// dimensions; the smaller one is the value-type axis.
    ///
    /// A malformed tensor is reported as "no detection" with a warning, not
    /// as an error: a missing detection is a normal pipeline outcome and the
    /// caller already has to handle it.
    pub fn decode(&self, output: &TensorOutput) -> Option<BoundingBox> {
        let (shape, data) = match output {
            TensorOutput::F32 { shape, data } => (shape.as_slice(), data.as_slice()),
            TensorOutput::I64 { shape, .. } => {
                warn!(?shape, "detector emitted an integer tensor, no detection");
                return None;
            }
        };

        if shape.len() != 3 || shape[0] != 1 {
            warn!(?shape, "unexpected detector output shape, no detection");
            return None;
        }
        let (d1, d2) = (shape[1] as usize, shape[2] as usize);
        if data.len() != d1 * d2 {
            warn!(
                ?shape,
                len = data.len(),
                "detector output length does not match its shape, no detection"
            );
            return None;
        }

        let channel_major = d1 < d2;
        let (num_values, num_candidates) = if channel_major { (d1, d2) } else { (d2, d1) };
        if num_values < 5 {
            warn!(num_values, "detector output carries no class scores, no detection");
            return None;
        }
        let num_classes = num_values - 4;

        let value = |v: usize, i: usize| -> f32 {
            if channel_major {
                data[v * num_candidates + i]
            } else {
                data[i * num_values + v]
            }
        };

        let mut best: Option<BoundingBox> = None;
        let mut best_confidence = 0.0f32;

        for i in 0..num_candidates {
            let mut confidence = f32::NEG_INFINITY;
            for c in 0..num_classes {
                let score = value(4 + c, i);
                if score > confidence {
                    confidence = score;
                }
            }

            if confidence > self.threshold && confidence > best_confidence {
                best_confidence = confidence;

                // Fractional outputs are scaled to input-space pixels; values
                // past 1.0 are taken as already being in pixels.
                let to_pixels = |v: f32| if v > 1.0 { v } else { v * self.input_size };
                let center_x = to_pixels(value(0, i));
                let center_y = to_pixels(value(1, i));
                let box_w = to_pixels(value(2, i));
                let box_h = to_pixels(value(3, i));

                // Corner convention, with the origin capped inside the frame
                // so the size clamp below stays well-formed.
                let x = (center_x - box_w / 2.0).max(0.0).min(self.input_size - 1.0);
                let y = (center_y - box_h / 2.0).max(0.0).min(self.input_size - 1.0);
                let width = box_w.clamp(1.0, self.input_size - x);
                let height = box_h.clamp(1.0, self.input_size - y);

                best = Some(BoundingBox::new(x, y, width, height, confidence));
            }
        }

        match &best {
            Some(found) => debug!(
                confidence = found.confidence,
                x = found.x,
                y = found.y,
                width = found.width,
                height = found.height,
                "detection selected"
            ),
            None => debug!(
                best_confidence,
                threshold = self.threshold,
                "no detection above threshold"
            ),
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: usize = 2;
    const VALUES: usize = 4 + CLASSES;

    /// Builds a row-major `[1, N, 4+C]` tensor from candidate rows, padding
    /// with zero candidates so the candidate axis is the longer one.
    fn row_major(candidates: &[[f32; VALUES]]) -> TensorOutput {
        let n = candidates.len().max(VALUES + 1);
        let mut data = vec![0.0f32; n * VALUES];
        for (i, row) in candidates.iter().enumerate() {
            data[i * VALUES..(i + 1) * VALUES].copy_from_slice(row);
        }
        TensorOutput::F32 {
            shape: vec![1, n as i64, VALUES as i64],
            data,
        }
    }

    /// Builds the channel-major `[1, 4+C, N]` transpose of the same rows.
    fn channel_major(candidates: &[[f32; VALUES]]) -> TensorOutput {
        let n = candidates.len();
        let mut data = vec![0.0f32; n * VALUES];
        for (i, row) in candidates.iter().enumerate() {
            for (v, &x) in row.iter().enumerate() {
                data[v * n + i] = x;
            }
        }
        TensorOutput::F32 {
            shape: vec![1, VALUES as i64, n as i64],
            data,
        }
    }

    #[test]
    fn picks_the_single_highest_candidate() {
        let decoder = DetectionDecoder::default();
        let output = row_major(&[
            [320.0, 320.0, 100.0, 100.0, 0.3, 0.1],
            [100.0, 100.0, 50.0, 50.0, 0.7, 0.2],
            [500.0, 500.0, 80.0, 80.0, 0.5, 0.6],
        ]);
        let found = decoder.decode(&output).unwrap();
        assert!((found.confidence - 0.7).abs() < 1e-6);
        assert!((found.x - 75.0).abs() < 1e-4);
        assert!((found.y - 75.0).abs() < 1e-4);
    }

    #[test]
    fn confidence_is_the_max_class_score() {
        let decoder = DetectionDecoder::default();
        // Second class score carries the max.
        let output = row_major(&[[320.0, 320.0, 100.0, 100.0, 0.05, 0.4]]);
        let found = decoder.decode(&output).unwrap();
        assert!((found.confidence - 0.4).abs() < 1e-6);
    }

    #[test]
    fn scores_at_or_below_threshold_are_not_detections() {
        let decoder = DetectionDecoder::default();
        assert!(decoder
            .decode(&row_major(&[[320.0, 320.0, 100.0, 100.0, 0.1, 0.1]]))
            .is_none());
        assert!(decoder
            .decode(&row_major(&[[320.0, 320.0, 100.0, 100.0, 0.09, 0.02]]))
            .is_none());
    }

    #[test]
    fn fractional_coordinates_scale_to_input_pixels() {
        let decoder = DetectionDecoder::default();
        let output = row_major(&[[0.5, 0.5, 0.25, 0.25, 0.9, 0.0]]);
        let found = decoder.decode(&output).unwrap();
        // Center (320, 320), size 160x160.
        assert!((found.x - 240.0).abs() < 1e-3);
        assert!((found.y - 240.0).abs() < 1e-3);
        assert!((found.width - 160.0).abs() < 1e-3);
        assert!((found.height - 160.0).abs() < 1e-3);
    }

    #[test]
    fn both_layouts_decode_to_the_same_box() {
        let decoder = DetectionDecoder::default();
        let candidates: Vec<[f32; VALUES]> = (0..8400)
            .map(|i| {
                if i == 1234 {
                    [300.0, 200.0, 120.0, 60.0, 0.15, 0.85]
                } else {
                    [0.0; VALUES]
                }
            })
            .collect();

        let row = decoder.decode(&row_major(&candidates)).unwrap();
        let chan = decoder.decode(&channel_major(&candidates)).unwrap();
        assert_eq!(row, chan);
        assert!((row.confidence - 0.85).abs() < 1e-6);
    }

    #[test]
    fn boxes_are_clamped_inside_the_input_square() {
        let decoder = DetectionDecoder::default();
        // Center near the corner with an oversized box.
        let output = row_major(&[[10.0, 630.0, 300.0, 300.0, 0.8, 0.0]]);
        let found = decoder.decode(&output).unwrap();
        assert!(found.x >= 0.0 && found.y >= 0.0);
        assert!(found.right() <= 640.0 + 1e-3);
        assert!(found.bottom() <= 640.0 + 1e-3);
    }

    #[test]
    fn malformed_shapes_decode_to_none() {
        let decoder = DetectionDecoder::default();

        // Wrong rank.
        let flat = TensorOutput::F32 {
            shape: vec![6],
            data: vec![0.0; 6],
        };
        assert!(decoder.decode(&flat).is_none());

        // Batch dimension above 1.
        let batched = TensorOutput::F32 {
            shape: vec![2, 1, VALUES as i64],
            data: vec![0.0; 2 * VALUES],
        };
        assert!(decoder.decode(&batched).is_none());

        // Length mismatch.
        let short = TensorOutput::F32 {
            shape: vec![1, 2, VALUES as i64],
            data: vec![0.0; 3],
        };
        assert!(decoder.decode(&short).is_none());

        // No class scores.
        let boxes_only = TensorOutput::F32 {
            shape: vec![1, 3, 4],
            data: vec![0.0; 12],
        };
        assert!(decoder.decode(&boxes_only).is_none());

        // Integer tensor.
        let ints = TensorOutput::I64 {
            shape: vec![1, 2, VALUES as i64],
            data: vec![0; 2 * VALUES],
        };
        assert!(decoder.decode(&ints).is_none());
    }

    #[test]
    fn every_returned_box_satisfies_the_validity_invariant() {
        let decoder = DetectionDecoder::default();
        let cases = [
            [0.0, 0.0, 640.0, 640.0, 0.5, 0.0],
            [639.0, 639.0, 2.0, 2.0, 0.5, 0.0],
            [0.9, 0.9, 0.9, 0.9, 0.5, 0.0],
            [320.0, 320.0, 2000.0, 2000.0, 0.5, 0.0],
        ];
        for case in cases {
            let found = decoder.decode(&row_major(&[case])).unwrap();
            assert!(found.x >= 0.0, "case {case:?}");
            assert!(found.y >= 0.0, "case {case:?}");
            assert!(found.width >= 1.0, "case {case:?}");
            assert!(found.height >= 1.0, "case {case:?}");
            assert!(found.right() <= 640.0 + 1e-3, "case {case:?}");
            assert!(found.bottom() <= 640.0 + 1e-3, "case {case:?}");
        }
    }
}
