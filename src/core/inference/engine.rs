//! Capability traits the pipeline consumes instead of a concrete runtime.
//!
//! The lifecycle manager and orchestrator are written against these traits
//! so tests can substitute scripted sessions for a real engine. The ONNX
//! Runtime implementation lives in [`super::ort`].

use std::path::Path;

use crate::core::errors::RecognitionResult;
use crate::core::inference::tensor::{ImageTensor, TensorOutput};

/// A live model session able to run one tensor computation at a time.
///
/// Closing a session is dropping it; any engine-side resources are released
/// in `Drop`.
pub trait InferenceSession: Send {
    /// Name of the graph input this session feeds.
    fn input_name(&self) -> &str;

    /// Runs the model on one input batch and returns its first output.
    ///
    /// Output-name resolution is positional: the first output the graph
    /// declares is the one returned. Every model this crate ships against
    /// declares exactly one output, and the contract is covered by tests
    /// rather than assumed.
    fn run(&mut self, input: &ImageTensor) -> RecognitionResult<TensorOutput>;
}

/// Capability to open [`InferenceSession`]s from model files on disk.
pub trait InferenceEngine: Send + Sync {
    /// Opens a session for the model graph at `model_path`.
    ///
    /// Engines that support external-weights files resolve them relative to
    /// `model_path`, which is why callers stage the auxiliary blob next to
    /// the graph before opening.
    fn open(&self, model_path: &Path) -> RecognitionResult<Box<dyn InferenceSession>>;
}
