//! Tensor values, engine capability traits, and the ONNX Runtime backend.

pub mod engine;
pub mod ort;
pub mod tensor;

pub use engine::{InferenceEngine, InferenceSession};
pub use ort::{OrtEngine, OrtSession};
pub use tensor::{ImageTensor, NormScheme, TensorOutput};
