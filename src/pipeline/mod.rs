//! The recognition pipeline module.
//!
//! This module provides the main pipeline implementation that sequences
//! detection, cropping, dual-model classification, and fusion into the
//! crate's externally visible entry points.

mod recognizer;

pub use recognizer::{DrugRecognizer, LoadSummary, RecognitionOutcome, VerifyOutcome};
