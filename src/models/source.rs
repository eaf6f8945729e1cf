//! Where model graphs and label tables come from.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{RecognitionError, RecognitionResult};

/// The three model roles the pipeline can hold at once.
///
/// Each role owns one slot in the [`ModelManager`](super::ModelManager);
/// loading a role never disturbs the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelRole {
    /// Package detector producing at most one box per frame.
    Detector,
    /// Classifier over the common drug set.
    CoarseClassifier,
    /// Classifier over the extended 150-class drug set.
    FineClassifier,
}

impl ModelRole {
    /// Every role in slot order.
    pub const ALL: [ModelRole; 3] = [
        ModelRole::Detector,
        ModelRole::CoarseClassifier,
        ModelRole::FineClassifier,
    ];

    /// Canonical file name the role's graph is staged under.
    ///
    /// ONNX graphs with external weights reference their companion file by
    /// name, so the staged graph has to keep this exact name for the runtime
    /// to resolve it.
    pub fn file_name(&self) -> &'static str {
        match self {
            ModelRole::Detector => "detection.onnx",
            ModelRole::CoarseClassifier => "classification.onnx",
            ModelRole::FineClassifier => "classification_150.onnx",
        }
    }

    /// File name of the external-weights companion.
    pub fn aux_file_name(&self) -> String {
        format!("{}.data", self.file_name())
    }

    /// File name of the label table next to the graph.
    pub fn labels_file_name(&self) -> &'static str {
        match self {
            ModelRole::Detector => "detection_labels.json",
            ModelRole::CoarseClassifier => "classification_labels.json",
            ModelRole::FineClassifier => "classification_150_labels.json",
        }
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelRole::Detector => "detector",
            ModelRole::CoarseClassifier => "coarse classifier",
            ModelRole::FineClassifier => "fine classifier",
        };
        f.write_str(name)
    }
}

/// Supplier of model bytes and label tables.
///
/// The manager stages whatever this returns into its own scratch directory
/// before handing it to the engine, so implementations are free to serve
/// embedded bytes, unpacked downloads, or plain files.
pub trait ModelSource {
    /// Raw ONNX graph for the role.
    fn model_bytes(&self, role: ModelRole) -> RecognitionResult<Vec<u8>>;

    /// External-weights companion for the role, when the export split the
    /// weights out of the graph. `None` means the graph is self-contained.
    fn aux_bytes(&self, role: ModelRole) -> RecognitionResult<Option<Vec<u8>>>;

    /// Class labels for the role, in model output order. An empty table is
    /// allowed; ranked results then fall back to `Unknown(index)` labels.
    fn class_names(&self, role: ModelRole) -> RecognitionResult<Vec<String>>;
}

/// [`ModelSource`] reading the conventional file layout from one directory.
///
/// Expected layout, with the weights and labels files optional per role:
///
/// ```text
/// models/
///   detection.onnx
///   classification.onnx
///   classification.onnx.data
///   classification_labels.json
///   classification_150.onnx
///   classification_150_labels.json
/// ```
#[derive(Debug, Clone)]
pub struct DirModelSource {
    dir: PathBuf,
}

impl DirModelSource {
    /// Creates a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ModelSource for DirModelSource {
    fn model_bytes(&self, role: ModelRole) -> RecognitionResult<Vec<u8>> {
        let path = self.path(role.file_name());
        fs::read(&path).map_err(|e| {
            RecognitionError::load_with(role, format!("cannot read {}", path.display()), e)
        })
    }

    fn aux_bytes(&self, role: ModelRole) -> RecognitionResult<Option<Vec<u8>>> {
        let path = self.path(&role.aux_file_name());
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| {
            RecognitionError::load_with(role, format!("cannot read {}", path.display()), e)
        })?;
        Ok(Some(bytes))
    }

    fn class_names(&self, role: ModelRole) -> RecognitionResult<Vec<String>> {
        let path = self.path(role.labels_file_name());
        if !path.is_file() {
            return Ok(Vec::new());
        }
        crate::utils::load_labels(&path).map_err(|e| {
            RecognitionError::load_with(role, format!("cannot load {}", path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_file_names_are_fixed() {
        assert_eq!(ModelRole::Detector.file_name(), "detection.onnx");
        assert_eq!(ModelRole::CoarseClassifier.file_name(), "classification.onnx");
        assert_eq!(ModelRole::FineClassifier.file_name(), "classification_150.onnx");
        assert_eq!(
            ModelRole::FineClassifier.aux_file_name(),
            "classification_150.onnx.data"
        );
    }

    #[test]
    fn dir_source_reads_the_conventional_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("classification.onnx"), b"graph").unwrap();
        fs::write(dir.path().join("classification.onnx.data"), b"weights").unwrap();
        fs::write(
            dir.path().join("classification_labels.json"),
            br#"["brufen", "panadol"]"#,
        )
        .unwrap();

        let source = DirModelSource::new(dir.path());
        let role = ModelRole::CoarseClassifier;
        assert_eq!(source.model_bytes(role).unwrap(), b"graph");
        assert_eq!(source.aux_bytes(role).unwrap(), Some(b"weights".to_vec()));
        assert_eq!(source.class_names(role).unwrap(), ["brufen", "panadol"]);
    }

    #[test]
    fn missing_graph_is_a_load_error_naming_the_role() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirModelSource::new(dir.path());
        let err = source.model_bytes(ModelRole::Detector).unwrap_err();
        assert!(matches!(err, RecognitionError::Load { .. }));
        assert!(err.to_string().contains("detector"));
    }

    #[test]
    fn missing_companions_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("detection.onnx"), b"graph").unwrap();
        let source = DirModelSource::new(dir.path());
        assert_eq!(source.aux_bytes(ModelRole::Detector).unwrap(), None);
        assert!(source.class_names(ModelRole::Detector).unwrap().is_empty());
    }

    #[test]
    fn malformed_labels_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("classification_labels.json"),
            br#"{"not": "an array"}"#,
        )
        .unwrap();
        let source = DirModelSource::new(dir.path());
        assert!(matches!(
            source.class_names(ModelRole::CoarseClassifier),
            Err(RecognitionError::Load { .. })
        ));
    }
}
