//! Core building blocks of the recognition pipeline.
//!
//! This module contains the pieces everything else leans on:
//! - Fixed numeric contracts shared with the trained models
//! - Runtime configuration
//! - Error handling
//! - Tensor values and the inference-engine capability boundary

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use config::RecognizerConfig;
pub use constants::*;
pub use errors::{RecognitionError, RecognitionResult};
pub use inference::{
    ImageTensor, InferenceEngine, InferenceSession, NormScheme, OrtEngine, TensorOutput,
};
