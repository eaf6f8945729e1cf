//! The end-to-end recognition pipeline.
//!
//! [`DrugRecognizer`] sequences the stages the rest of the crate provides:
//! encode the frame, run the detector, project and cut the crop, run both
//! classifiers on it, fuse their rankings, and optionally match the winner
//! against an expected name. Detection is a hard dependency of everything
//! after it; the two classifiers are independent of each other and run
//! concurrently, with either one's failure recovered locally.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::config::RecognizerConfig;
use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::core::inference::{InferenceEngine, OrtEngine};
use crate::domain::{drug_names_match, fuse_predictions, ClassifierKind, FusedResult, Prediction};
use crate::models::{ModelManager, ModelRole, ModelSource};
use crate::processors::{
    BoundingBox, ClassificationDecoder, CropRegion, DetectionDecoder, RankedClasses,
    RegionCropper, TensorEncoder,
};
use crate::utils::load_image;

#[cfg(test)]
#[path = "recognizer_tests.rs"]
mod recognizer_tests;

/// Which roles came up after [`DrugRecognizer::load_models`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// The detector session is live.
    pub detector: bool,
    /// The coarse classifier session is live.
    pub coarse: bool,
    /// The fine classifier session is live. `false` means recognition runs
    /// coarse-only until a retried load succeeds.
    pub fine: bool,
}

/// What one recognition call produced.
///
/// All three variants are successful calls. Pipeline breakage travels on the
/// error channel instead, so callers can always tell "nothing was there"
/// apart from "something went wrong".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecognitionOutcome {
    /// A package was detected and at least one classifier named it.
    Recognized(FusedResult),
    /// No candidate cleared the detection threshold.
    NoDetection,
    /// A package was detected but both classifiers came back empty.
    NoClassification {
        /// Box the detector reported, in its input space.
        detection: BoundingBox,
        /// Region of the original image the classifiers were shown.
        crop: CropRegion,
    },
}

impl RecognitionOutcome {
    /// The fused result, when recognition produced one.
    pub fn recognized(&self) -> Option<&FusedResult> {
        match self {
            RecognitionOutcome::Recognized(result) => Some(result),
            _ => None,
        }
    }
}

/// Answer to "is this the drug the schedule expects".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Whether the recognized name matched the expected name.
    pub matched: bool,
    /// Top recognized name, when recognition produced one.
    pub recognized_name: Option<String>,
    /// Confidence of the top prediction, 0.0 when nothing was recognized.
    pub confidence: f32,
}

impl VerifyOutcome {
    fn unmatched() -> Self {
        Self {
            matched: false,
            recognized_name: None,
            confidence: 0.0,
        }
    }
}

/// Detect, crop, classify, fuse. The externally visible entry point.
pub struct DrugRecognizer {
    manager: ModelManager,
    config: RecognizerConfig,
    detection_encoder: TensorEncoder,
    classification_encoder: TensorEncoder,
    detection_decoder: DetectionDecoder,
    classification_decoder: ClassificationDecoder,
    cropper: RegionCropper,
}

impl DrugRecognizer {
    /// Creates a recognizer on the default ONNX Runtime engine.
    pub fn new(config: RecognizerConfig) -> RecognitionResult<Self> {
        Self::with_engine(OrtEngine::new(), config)
    }

    /// Creates a recognizer on a caller-supplied engine.
    pub fn with_engine(
        engine: impl InferenceEngine + 'static,
        config: RecognizerConfig,
    ) -> RecognitionResult<Self> {
        config.validate()?;
        Ok(Self {
            manager: ModelManager::new(engine),
            detection_encoder: TensorEncoder::detection(config.detection_size),
            classification_encoder: TensorEncoder::classification(config.classification_size),
            detection_decoder: DetectionDecoder::new(
                config.detection_size,
                config.confidence_threshold,
            ),
            classification_decoder: ClassificationDecoder::new(config.max_results),
            cropper: RegionCropper::new(config.detection_size, config.crop_padding),
            config,
        })
    }

    /// Configuration the recognizer was built with.
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Loads all three models from `source`.
    ///
    /// The detector and coarse classifier are required. The fine classifier
    /// is allowed to fail at load; recognition then proceeds coarse-only and
    /// a later [`load_models`](Self::load_models) call may bring it up.
    pub fn load_models(&self, source: &dyn ModelSource) -> RecognitionResult<LoadSummary> {
        self.manager.load(ModelRole::Detector, source)?;
        self.manager.load(ModelRole::CoarseClassifier, source)?;
        let fine = match self.manager.load(ModelRole::FineClassifier, source) {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "fine classifier unavailable, continuing coarse-only");
                false
            }
        };
        Ok(LoadSummary {
            detector: true,
            coarse: true,
            fine,
        })
    }

    /// True when the role has a live session.
    pub fn is_loaded(&self, role: ModelRole) -> bool {
        self.manager.is_loaded(role)
    }

    /// Releases every session and staged file. Safe to call repeatedly.
    pub fn dispose(&self) {
        self.manager.dispose_all();
    }

    /// Runs the full pipeline on one frame.
    ///
    /// Detector failure is fatal to the call. A classifier failure only
    /// removes that model's votes; the frame is still recognized from the
    /// other model when it produces anything.
    pub fn recognize(&self, image: &RgbImage) -> RecognitionResult<RecognitionOutcome> {
        let tensor = self.detection_encoder.encode(image)?;
        let (output, _) = self.manager.run(ModelRole::Detector, &tensor)?;

        let Some(detection) = self.detection_decoder.decode(&output) else {
            info!("no package detected");
            return Ok(RecognitionOutcome::NoDetection);
        };

        let (cropped, crop) = self.cropper.crop(image, &detection)?;
        debug!(
            width = crop.width,
            height = crop.height,
            "classifying detected region"
        );

        let (coarse, fine) = rayon::join(
            || self.classifier_votes(ModelRole::CoarseClassifier, &cropped, ClassifierKind::Coarse),
            || self.classifier_votes(ModelRole::FineClassifier, &cropped, ClassifierKind::Fine),
        );

        let fused = fuse_predictions(coarse, fine, self.config.max_results);
        if fused.is_empty() {
            info!("package detected but neither classifier named it");
            return Ok(RecognitionOutcome::NoClassification { detection, crop });
        }

        let top = fused[0].clone();
        info!(
            name = %top.class_name,
            confidence = top.confidence,
            source = %top.source,
            "drug recognized"
        );
        Ok(RecognitionOutcome::Recognized(FusedResult {
            top,
            ranked: fused,
            detection,
            crop,
        }))
    }

    /// Recognizes the frame and checks the top name against `expected`.
    ///
    /// Frames that produced no name (no detection, no classification) verify
    /// as unmatched rather than erroring; the caller's schedule logic treats
    /// both the same way.
    pub fn verify(&self, image: &RgbImage, expected: &str) -> RecognitionResult<VerifyOutcome> {
        match self.recognize(image)? {
            RecognitionOutcome::Recognized(result) => {
                let matched = drug_names_match(&result.top.class_name, expected);
                info!(
                    matched,
                    recognized = %result.top.class_name,
                    expected,
                    "verification decided"
                );
                Ok(VerifyOutcome {
                    matched,
                    recognized_name: Some(result.top.class_name),
                    confidence: result.top.confidence,
                })
            }
            _ => Ok(VerifyOutcome::unmatched()),
        }
    }

    /// Classifies an already-cropped image with one classifier, skipping
    /// detection entirely. Useful for accuracy checks on curated crops.
    pub fn classify(&self, image: &RgbImage, role: ModelRole) -> RecognitionResult<RankedClasses> {
        if role == ModelRole::Detector {
            return Err(RecognitionError::invalid_input(
                "classify requires a classifier role",
            ));
        }
        self.classify_crop(role, image)
    }

    /// Loads the image at `path` and recognizes it.
    pub fn recognize_path(&self, path: impl AsRef<Path>) -> RecognitionResult<RecognitionOutcome> {
        let image = load_image(path.as_ref())?;
        self.recognize(&image)
    }

    /// Loads the image at `path` and verifies it against `expected`.
    pub fn verify_path(
        &self,
        path: impl AsRef<Path>,
        expected: &str,
    ) -> RecognitionResult<VerifyOutcome> {
        let image = load_image(path.as_ref())?;
        self.verify(&image, expected)
    }

    fn classify_crop(&self, role: ModelRole, crop: &RgbImage) -> RecognitionResult<RankedClasses> {
        let tensor = self.classification_encoder.encode(crop)?;
        let (output, labels) = self.manager.run(role, &tensor)?;
        self.classification_decoder.decode(output, &labels)
    }

    /// One classifier's votes over the crop, recovered to empty on failure
    /// so the other model can still carry the frame.
    fn classifier_votes(
        &self,
        role: ModelRole,
        crop: &RgbImage,
        kind: ClassifierKind,
    ) -> Vec<Prediction> {
        match self.classify_crop(role, crop) {
            Ok(ranked) => ranked
                .into_vec()
                .into_iter()
                .map(|score| Prediction::from_score(score, kind))
                .collect(),
            Err(error) => {
                warn!(%role, error = %error, "classifier contributed no predictions");
                Vec::new()
            }
        }
    }
}
