//! # PillScan
//!
//! A Rust library that recognizes medication packages in photos using ONNX
//! models. One detector finds the package, two classifiers name the drug,
//! and their votes are fused into a single ranked answer.
//!
//! ## Features
//!
//! - Complete pipeline from camera frame to drug name
//! - Dual-model ensemble: a coarse classifier over the common drugs plus a
//!   fine 150-class classifier, fused by normalized-name identity
//! - Best-of-N detection tuned for "one package per frame" capture
//! - Lenient name matching for medication-schedule verification
//! - Concurrent classifier execution via rayon
//! - ONNX Runtime integration for fast on-device inference
//!
//! ## Components
//!
//! - **Detection**: locate the package in a 640x640 squashed frame
//! - **Cropping**: project the box back onto the original image with padding
//! - **Classification**: softmax-rank both models' logits over the crop
//! - **Fusion**: deduplicate and merge the two rankings
//! - **Verification**: match the winner against an expected drug name
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, and the inference engine seam
//! * [`domain`] - Predictions, fusion, and drug-name normalization
//! * [`models`] - Model sourcing, staging, and session lifecycle
//! * [`pipeline`] - The end-to-end recognizer
//! * [`processors`] - Pure encoding, decoding, and geometry stages
//! * [`utils`] - Image loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pillscan::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recognizer = DrugRecognizer::new(RecognizerConfig::default())?;
//! recognizer.load_models(&DirModelSource::new("models"))?;
//!
//! match recognizer.recognize_path("frame.jpg")? {
//!     RecognitionOutcome::Recognized(result) => {
//!         println!("{} ({:.1}%)", result.top.class_name, result.top.confidence * 100.0);
//!     }
//!     RecognitionOutcome::NoDetection => println!("no package in the frame"),
//!     RecognitionOutcome::NoClassification { .. } => println!("package found, name unknown"),
//! }
//!
//! let check = recognizer.verify_path("frame.jpg", "Brufen")?;
//! println!("matches the schedule: {}", check.matched);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use pillscan::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - The recognizer and its outcomes (`DrugRecognizer`, `RecognitionOutcome`,
///   `VerifyOutcome`, `LoadSummary`)
/// - Results (`FusedResult`, `Prediction`, `ClassifierKind`)
/// - Model sourcing (`DirModelSource`, `ModelRole`, `ModelSource`)
/// - Configuration and errors (`RecognizerConfig`, `RecognitionError`,
///   `RecognitionResult`)
/// - Basic image loading (`load_image`)
///
/// For lower-level pieces (decoders, the engine seam, the model manager),
/// import directly from the respective modules (e.g. `pillscan::processors`,
/// `pillscan::models`).
pub mod prelude {
    pub use crate::pipeline::{DrugRecognizer, LoadSummary, RecognitionOutcome, VerifyOutcome};

    pub use crate::domain::{ClassifierKind, FusedResult, Prediction};

    pub use crate::models::{DirModelSource, ModelRole, ModelSource};

    pub use crate::core::{RecognitionError, RecognitionResult, RecognizerConfig};

    pub use crate::utils::load_image;
}
