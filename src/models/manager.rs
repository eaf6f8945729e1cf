//! Slot-per-role storage of live inference sessions.
//!
//! Model bytes arrive from a [`ModelSource`], get staged into a scratch
//! directory (ONNX external weights resolve relative to the graph file), and
//! stay on disk for as long as the session is alive. Dropping a slot drops
//! the session and its staging directory together.

use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::core::errors::{RecognitionError, RecognitionResult};
use crate::core::inference::{ImageTensor, InferenceEngine, OrtEngine, TensorOutput};
use crate::models::source::{ModelRole, ModelSource};

struct LoadedModel {
    session: Box<dyn crate::core::inference::InferenceSession>,
    class_names: Arc<[String]>,
    // Keeps the staged graph and weights on disk while the session is live.
    _stage: tempfile::TempDir,
}

/// Owner of the three model sessions, one independent slot per role.
///
/// All methods take `&self`; each slot has its own lock, so loading or
/// running one role never blocks the others. Loading an already loaded role
/// is a no-op, which makes warm-up calls safe to repeat.
pub struct ModelManager {
    engine: Box<dyn InferenceEngine>,
    slots: [Mutex<Option<LoadedModel>>; 3],
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new(OrtEngine::new())
    }
}

impl ModelManager {
    /// Creates a manager running sessions on the given engine.
    pub fn new(engine: impl InferenceEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
            slots: [Mutex::new(None), Mutex::new(None), Mutex::new(None)],
        }
    }

    fn slot(&self, role: ModelRole) -> RecognitionResult<MutexGuard<'_, Option<LoadedModel>>> {
        self.slots[role as usize]
            .lock()
            .map_err(|_| RecognitionError::inference(format!("{role} slot lock poisoned")))
    }

    /// Stages and opens the role's model, unless the slot is already live.
    ///
    /// The slot lock is held for the whole load, so two concurrent loads of
    /// the same role stage the bytes once. On failure the slot stays empty
    /// and the call may be retried.
    pub fn load(&self, role: ModelRole, source: &dyn ModelSource) -> RecognitionResult<()> {
        let mut slot = self.slot(role)?;
        if slot.is_some() {
            debug!(%role, "already loaded, skipping restage");
            return Ok(());
        }

        let bytes = source.model_bytes(role)?;
        if bytes.is_empty() {
            return Err(RecognitionError::load(role, "source returned an empty graph"));
        }

        let stage = tempfile::Builder::new()
            .prefix("pillscan-models-")
            .tempdir()
            .map_err(|e| {
                RecognitionError::load_with(role, "cannot create staging directory", e)
            })?;

        let model_path = stage.path().join(role.file_name());
        fs::write(&model_path, &bytes)
            .map_err(|e| RecognitionError::load_with(role, "cannot stage graph", e))?;

        let mut staged_weights = false;
        if let Some(aux) = source.aux_bytes(role)? {
            fs::write(stage.path().join(role.aux_file_name()), &aux).map_err(|e| {
                RecognitionError::load_with(role, "cannot stage external weights", e)
            })?;
            staged_weights = true;
        }

        let class_names: Arc<[String]> = source.class_names(role)?.into();
        let session = self
            .engine
            .open(&model_path)
            .map_err(|e| RecognitionError::load_with(role, "engine rejected the graph", e))?;

        info!(
            %role,
            bytes = bytes.len(),
            labels = class_names.len(),
            external_weights = staged_weights,
            "model loaded"
        );
        *slot = Some(LoadedModel {
            session,
            class_names,
            _stage: stage,
        });
        Ok(())
    }

    /// Runs one forward pass on the role's session.
    ///
    /// Returns the raw output together with the label table that was loaded
    /// alongside the model, so decoders cannot pair an output with the wrong
    /// role's labels.
    pub fn run(
        &self,
        role: ModelRole,
        input: &ImageTensor,
    ) -> RecognitionResult<(TensorOutput, Arc<[String]>)> {
        let mut slot = self.slot(role)?;
        let loaded = slot
            .as_mut()
            .ok_or_else(|| RecognitionError::model_not_loaded(role))?;
        let output = loaded.session.run(input)?;
        Ok((output, loaded.class_names.clone()))
    }

    /// True when the role has a live session.
    pub fn is_loaded(&self, role: ModelRole) -> bool {
        self.slots[role as usize]
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Drops the role's session and its staged files.
    pub fn dispose(&self, role: ModelRole) {
        if let Ok(mut slot) = self.slots[role as usize].lock() {
            if slot.take().is_some() {
                info!(%role, "model disposed");
            }
        }
    }

    /// Drops every live session.
    pub fn dispose_all(&self) {
        for role in ModelRole::ALL {
            self.dispose(role);
        }
    }
}
