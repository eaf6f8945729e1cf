//! Fixed numeric contracts shared with the trained models.
//!
//! These values are part of the wire contract: the detector and the two
//! classifiers were exported with these input sizes and the decoders assume
//! them. Changing any of them silently degrades accuracy instead of erroring.

/// Square input side length the detector was exported with.
pub const DETECTION_INPUT_SIZE: u32 = 640;

/// Square input side length both classifiers were exported with.
pub const CLASSIFICATION_INPUT_SIZE: u32 = 224;

/// Minimum class score a detection candidate must strictly exceed.
///
/// The detector emits raw per-class scores without an objectness term,
/// and real scores on device tend to be small, so the bar sits low.
pub const CONFIDENCE_THRESHOLD: f32 = 0.1;

/// Fraction of each crop dimension added as padding on every side.
pub const CROP_PADDING_RATIO: f32 = 0.1;

/// Maximum number of entries kept in a fused ranked list.
pub const MAX_RANKED_RESULTS: usize = 5;
