//! Pure image and tensor processing stages.
//!
//! Everything in this module is deterministic math with no model or session
//! state: pixel normalization, tensor encoding, detection decoding, crop
//! projection, and logit ranking. The pipeline wires these stages around the
//! inference engine; tests drive them directly with hand-built data.
//!
//! # Modules
//!
//! * `classification` - Softmax ranking of classifier logits
//! * `crop` - Projection of detector boxes onto the source image
//! * `detection` - Best-candidate decoding of the detector output grid
//! * `encode` - Resize plus normalization into model input tensors
//! * `geometry` - Box and region primitives shared by the stages
//! * `normalization` - Per-scheme pixel normalization

mod classification;
mod crop;
mod detection;
mod encode;
mod geometry;
mod normalization;

pub use classification::{ClassScore, ClassificationDecoder, RankedClasses};
pub use crop::RegionCropper;
pub use detection::DetectionDecoder;
pub use encode::TensorEncoder;
pub use geometry::{BoundingBox, CropRegion};
pub use normalization::PixelNormalizer;
