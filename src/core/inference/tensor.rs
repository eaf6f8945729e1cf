//! Backend-agnostic tensor values crossing the engine boundary.
//!
//! [`ImageTensor`] is the only input the pipeline ever feeds a model: a
//! single-image NCHW float batch tagged with the normalization scheme that
//! produced it. [`TensorOutput`] is the raw result of a forward pass with no
//! semantic interpretation attached; the decoders inspect its shape at
//! runtime before reading anything out of it.

use ndarray::{Array2, Array3, Array4, ArrayView4};

use crate::core::errors::{RecognitionError, RecognitionResult};

/// Pixel normalization applied when a tensor was encoded.
///
/// The scheme is part of the wire contract with the trained models:
/// feeding a classifier a `Detection`-scheme tensor silently degrades
/// accuracy instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormScheme {
    /// Plain rescale of byte channels to [0, 1].
    Detection,
    /// Rescale to [0, 1] then center to [-1, 1] with mean 0.5, std 0.5.
    Classification,
}

/// A normalized single-image input batch in NCHW layout.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    scheme: NormScheme,
    data: Array4<f32>,
}

impl ImageTensor {
    /// Wraps an already-normalized NCHW batch.
    pub fn new(scheme: NormScheme, data: Array4<f32>) -> Self {
        Self { scheme, data }
    }

    /// Scheme the pixels were normalized with.
    pub fn scheme(&self) -> NormScheme {
        self.scheme
    }

    /// Borrowed NCHW view for the engine.
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// Shape as `[batch, channels, height, width]`.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// Raw output of one forward pass.
///
/// The engine reports whatever dtype the graph produced; interpreting the
/// shape is the caller's job. This keeps the engine boundary free of model
/// knowledge and lets tests feed decoders hand-built tensors.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorOutput {
    /// 32-bit float tensor, the usual case for logits and detection grids.
    F32 { shape: Vec<i64>, data: Vec<f32> },
    /// 64-bit integer tensor, seen from graphs that emit class ids directly.
    I64 { shape: Vec<i64>, data: Vec<i64> },
}

impl TensorOutput {
    /// Builds an f32 tensor, checking that the data length matches the shape.
    pub fn f32(shape: Vec<i64>, data: Vec<f32>) -> RecognitionResult<Self> {
        let expected: usize = shape.iter().map(|&d| d as usize).product();
        if data.len() != expected {
            return Err(RecognitionError::decode(format!(
                "data length {} does not match shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(TensorOutput::F32 { shape, data })
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> &[i64] {
        match self {
            TensorOutput::F32 { shape, .. } => shape,
            TensorOutput::I64 { shape, .. } => shape,
        }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().map(|&d| d as usize).product()
    }

    /// True when the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extracts a 2D f32 array, validating rank and data length.
    pub fn try_into_array2_f32(self) -> RecognitionResult<Array2<f32>> {
        match self {
            TensorOutput::F32 { shape, data } => {
                if shape.len() != 2 {
                    return Err(RecognitionError::decode(format!(
                        "expected 2D tensor, got {}D with shape {:?}",
                        shape.len(),
                        shape
                    )));
                }
                let (d0, d1) = (shape[0] as usize, shape[1] as usize);
                if data.len() != d0 * d1 {
                    return Err(RecognitionError::decode(format!(
                        "data length {} does not match shape {:?}",
                        data.len(),
                        shape
                    )));
                }
                Ok(Array2::from_shape_vec((d0, d1), data)?)
            }
            TensorOutput::I64 { .. } => {
                Err(RecognitionError::decode("expected f32 tensor, got i64"))
            }
        }
    }

    /// Extracts a 3D f32 array, validating rank and data length.
    pub fn try_into_array3_f32(self) -> RecognitionResult<Array3<f32>> {
        match self {
            TensorOutput::F32 { shape, data } => {
                if shape.len() != 3 {
                    return Err(RecognitionError::decode(format!(
                        "expected 3D tensor, got {}D with shape {:?}",
                        shape.len(),
                        shape
                    )));
                }
                let (d0, d1, d2) = (shape[0] as usize, shape[1] as usize, shape[2] as usize);
                if data.len() != d0 * d1 * d2 {
                    return Err(RecognitionError::decode(format!(
                        "data length {} does not match shape {:?}",
                        data.len(),
                        shape
                    )));
                }
                Ok(Array3::from_shape_vec((d0, d1, d2), data)?)
            }
            TensorOutput::I64 { .. } => {
                Err(RecognitionError::decode("expected f32 tensor, got i64"))
            }
        }
    }

    /// Flattens an f32 tensor of any rank into its backing data.
    ///
    /// Classifier heads ship as either `[C]` or `[1, C]` depending on the
    /// export; callers that only need the logit sequence use this.
    pub fn into_flat_f32(self) -> RecognitionResult<Vec<f32>> {
        match self {
            TensorOutput::F32 { shape, data } => {
                let expected: usize = shape.iter().map(|&d| d as usize).product();
                if data.len() != expected {
                    return Err(RecognitionError::decode(format!(
                        "data length {} does not match shape {:?}",
                        data.len(),
                        shape
                    )));
                }
                Ok(data)
            }
            TensorOutput::I64 { .. } => {
                Err(RecognitionError::decode("expected f32 tensor, got i64"))
            }
        }
    }
}
