//! Error types for the recognition pipeline.
//!
//! One enum covers every failure the crate surfaces: lifecycle problems
//! (loading, missing sessions), contract violations (bad geometry, bad
//! shapes), engine failures, and the ambient IO/image/tensor errors that
//! convert in via `From`.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type RecognitionResult<T> = std::result::Result<T, RecognitionError>;

/// Errors surfaced by the recognition pipeline.
///
/// The first four variants are the pipeline's own contract:
/// [`ModelNotLoaded`](RecognitionError::ModelNotLoaded) and
/// [`InvalidInput`](RecognitionError::InvalidInput) are caller-side logic
/// errors and are never retried; [`Inference`](RecognitionError::Inference)
/// may succeed on a retry of the whole call;
/// [`Decode`](RecognitionError::Decode) means an output tensor did not match
/// the expected layout. A missing *detection* is not an error at all; the
/// detection decoder reports it as "not found" and the orchestrator maps it
/// to a distinct outcome.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// An inference call was issued for a role with no live session.
    #[error("model not loaded: {role}")]
    ModelNotLoaded {
        /// Role the call was issued against.
        role: String,
    },

    /// Malformed bounding box, crop geometry, or similar contract violation.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// The engine rejected the tensor shapes or failed internally.
    #[error("inference failed: {context}")]
    Inference {
        /// Where in the pipeline the failure happened.
        context: String,
        /// Underlying engine error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An output tensor did not have the expected rank, shape, or dtype.
    #[error("decode failed: {message}")]
    Decode {
        /// What the decoder expected and what it got.
        message: String,
    },

    /// Model bytes could not be read or the engine rejected the graph.
    ///
    /// The role's handle stays unset after this error; a retry is permitted.
    #[error("failed to load {role}: {message}")]
    Load {
        /// Role being loaded.
        role: String,
        /// Human-readable cause.
        message: String,
        /// Underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configuration value is out of range or a config file is malformed.
    #[error("configuration: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },

    /// Error occurred while decoding an image file.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor reshaping.
    #[error("tensor shape")]
    Shape(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl RecognitionError {
    /// Error for an inference call issued before a successful load.
    pub fn model_not_loaded(role: impl std::fmt::Display) -> Self {
        Self::ModelNotLoaded {
            role: role.to_string(),
        }
    }

    /// Error for a caller-side contract violation.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Engine failure without an underlying error value.
    pub fn inference(context: impl Into<String>) -> Self {
        Self::Inference {
            context: context.into(),
            source: None,
        }
    }

    /// Engine failure wrapping the underlying error.
    pub fn inference_with(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Error for an output tensor that did not match expectations.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Load failure without an underlying error value.
    pub fn load(role: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Load {
            role: role.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Load failure wrapping the underlying error.
    pub fn load_with(
        role: impl std::fmt::Display,
        message: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Load {
            role: role.to_string(),
            message: message.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Error for an out-of-range or malformed configuration value.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
