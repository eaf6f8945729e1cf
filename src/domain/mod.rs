//! Drug-name semantics shared across the recognition pipeline.
//!
//! This module holds the concepts that exist above raw tensors: predictions
//! attributed to a classifier, the fused per-frame result, and the name
//! normalization that makes labels from differently-trained models
//! comparable at all.

mod fusion;
mod name;

pub use fusion::{fuse_predictions, ClassifierKind, FusedResult, Prediction};
pub use name::{drug_names_match, name_similarity, normalize_drug_name, primary_drug_name};
