//! Converts classifier logits into a ranked probability list.
//!
//! Both classifier heads emit one raw logit per class, as either `[C]` or
//! `[1, C]` depending on the export. Logits go through a numerically stable
//! softmax and come out as a descending list of `(index, label, probability)`
//! entries truncated to the configured depth.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::constants::MAX_RANKED_RESULTS;
use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::core::inference::TensorOutput;

/// One class with its softmax probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    /// Index of the class in the model's output vector.
    pub index: usize,
    /// Human-readable label for the class.
    pub label: String,
    /// Softmax probability in `[0, 1]`.
    pub confidence: f32,
}

/// Classes ordered by descending probability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankedClasses {
    scores: Vec<ClassScore>,
}

impl RankedClasses {
    /// Wraps an already descending-sorted score list.
    pub fn new(scores: Vec<ClassScore>) -> Self {
        Self { scores }
    }

    /// Highest-probability class, if any.
    pub fn top(&self) -> Option<&ClassScore> {
        self.scores.first()
    }

    /// Iterates scores from most to least probable.
    pub fn iter(&self) -> impl Iterator<Item = &ClassScore> {
        self.scores.iter()
    }

    /// Number of ranked classes.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no class was ranked.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Consumes the ranking into its score list.
    pub fn into_vec(self) -> Vec<ClassScore> {
        self.scores
    }
}

/// Decoder for a softmax classification head.
#[derive(Debug, Clone)]
pub struct ClassificationDecoder {
    max_results: usize,
}

impl Default for ClassificationDecoder {
    fn default() -> Self {
        Self::new(MAX_RANKED_RESULTS)
    }
}

impl ClassificationDecoder {
    /// Creates a decoder that keeps at most `max_results` classes.
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// Decodes raw logits into a ranked class list.
    ///
    /// Classes past the label table are reported as `Unknown(index)` rather
    /// than dropped, so a stale label file cannot silently shift rankings.
    pub fn decode(
        &self,
        output: TensorOutput,
        labels: &[String],
    ) -> RecognitionResult<RankedClasses> {
        let logits = output.into_flat_f32()?;
        if logits.is_empty() {
            return Err(RecognitionError::decode("classifier produced an empty tensor"));
        }
        if !labels.is_empty() && labels.len() != logits.len() {
            warn!(
                labels = labels.len(),
                classes = logits.len(),
                "label count does not match classifier output"
            );
        }

        let probabilities = softmax(&logits);

        let mut order: Vec<usize> = (0..probabilities.len()).collect();
        // Stable sort keeps the earlier index on ties.
        order.sort_by(|&a, &b| {
            probabilities[b]
                .partial_cmp(&probabilities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let scores: Vec<ClassScore> = order
            .into_iter()
            .take(self.max_results)
            .map(|index| ClassScore {
                index,
                label: labels
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Unknown({index})")),
                confidence: probabilities[index],
            })
            .collect();

        if let Some(top) = scores.first() {
            debug!(label = %top.label, confidence = top.confidence, "classification decoded");
        }
        Ok(RankedClasses::new(scores))
    }
}

/// Numerically stable softmax.
///
/// Non-finite logits contribute zero probability. When nothing finite
/// remains the whole distribution collapses to zeros instead of NaN.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f32> = logits
        .iter()
        .map(|&v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.iter().map(|&e| e / sum).collect()
}
