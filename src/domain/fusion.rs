//! Merges the two classifiers' rankings into one deduplicated list.
//!
//! The coarse and fine models overlap on the common drugs but label them
//! differently, so entries are deduplicated by normalized name, not by class
//! index. The fine model's vote replaces a coarse entry only when it is
//! strictly more confident.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::name::normalize_drug_name;
use crate::processors::{BoundingBox, ClassScore, CropRegion};

/// Which classifier a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// The small model over the common drug set.
    Coarse,
    /// The extended 150-class model.
    Fine,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ClassifierKind::Coarse => "coarse",
            ClassifierKind::Fine => "fine",
        })
    }
}

/// One classifier vote for a drug name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Index in the source model's output vector.
    pub class_index: usize,
    /// Label as the source model's label table spells it.
    pub class_name: String,
    /// Softmax probability from the source model.
    pub confidence: f32,
    /// Model the vote came from.
    pub source: ClassifierKind,
}

impl Prediction {
    /// Turns a decoded class score into a prediction attributed to `source`.
    pub fn from_score(score: ClassScore, source: ClassifierKind) -> Self {
        Self {
            class_index: score.index,
            class_name: score.label,
            confidence: score.confidence,
            source,
        }
    }
}

/// Final recognition result for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    /// Highest-confidence prediction after fusion.
    pub top: Prediction,
    /// Fused ranking, descending by confidence. No two entries share a
    /// normalized name.
    pub ranked: Vec<Prediction>,
    /// Detector box in input space that located the package.
    pub detection: BoundingBox,
    /// Region of the original image the classifiers actually saw.
    pub crop: CropRegion,
}

/// Fuses the two rankings into one list of at most `max_results` entries.
///
/// Coarse entries are taken first in ranked order, one per normalized name.
/// Fine entries then either claim an unseen name or replace an existing
/// entry when strictly more confident. The result is re-sorted descending
/// and truncated.
pub fn fuse_predictions(
    coarse: Vec<Prediction>,
    fine: Vec<Prediction>,
    max_results: usize,
) -> Vec<Prediction> {
    let mut fused: Vec<Prediction> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for prediction in coarse {
        let key = normalize_drug_name(&prediction.class_name);
        if !seen.contains_key(&key) {
            seen.insert(key, fused.len());
            fused.push(prediction);
        }
    }

    for prediction in fine {
        let key = normalize_drug_name(&prediction.class_name);
        match seen.get(&key) {
            None => {
                seen.insert(key, fused.len());
                fused.push(prediction);
            }
            Some(&index) => {
                if prediction.confidence > fused[index].confidence {
                    fused[index] = prediction;
                }
            }
        }
    }

    fused.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(max_results);
    fused
}
