//! ONNX Runtime implementation of the engine capability.

use std::path::Path;

use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::debug;

use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::core::inference::engine::{InferenceEngine, InferenceSession};
use crate::core::inference::tensor::{ImageTensor, TensorOutput};

/// Opens [`OrtSession`]s from ONNX model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrtEngine;

impl OrtEngine {
    /// Creates an engine with default ONNX Runtime settings.
    pub fn new() -> Self {
        Self
    }
}

impl InferenceEngine for OrtEngine {
    fn open(&self, model_path: &Path) -> RecognitionResult<Box<dyn InferenceSession>> {
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(model_path)
            .map_err(|e| {
                RecognitionError::inference_with(
                    format!("failed to open session for {}", model_path.display()),
                    e,
                )
            })?;

        // Both names come from graph metadata; the single-input single-output
        // shape of these models makes positional resolution unambiguous.
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| {
                RecognitionError::invalid_input(format!(
                    "model {} declares no inputs",
                    model_path.display()
                ))
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                RecognitionError::invalid_input(format!(
                    "model {} declares no outputs",
                    model_path.display()
                ))
            })?;

        debug!(
            model = %model_path.display(),
            input = %input_name,
            output = %output_name,
            "opened onnx session"
        );

        Ok(Box::new(OrtSession {
            session,
            input_name,
            output_name,
        }))
    }
}

/// One ONNX Runtime session with its resolved input and output names.
pub struct OrtSession {
    session: Session,
    input_name: String,
    output_name: String,
}

impl InferenceSession for OrtSession {
    fn input_name(&self) -> &str {
        &self.input_name
    }

    fn run(&mut self, input: &ImageTensor) -> RecognitionResult<TensorOutput> {
        let input_shape = input.shape().to_vec();
        let tensor = TensorRef::from_array_view(input.view()).map_err(|e| {
            RecognitionError::inference_with(
                format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| {
                RecognitionError::inference_with(
                    format!(
                        "forward pass failed with input '{}' -> output '{}'",
                        self.input_name, self.output_name
                    ),
                    e,
                )
            })?;

        let value = &outputs[self.output_name.as_str()];
        if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
            return Ok(TensorOutput::F32 {
                shape: shape.to_vec(),
                data: data.to_vec(),
            });
        }
        let (shape, data) = value.try_extract_tensor::<i64>().map_err(|e| {
            RecognitionError::inference_with(
                format!("output '{}' is neither f32 nor i64", self.output_name),
                e,
            )
        })?;
        Ok(TensorOutput::I64 {
            shape: shape.to_vec(),
            data: data.to_vec(),
        })
    }
}
