//! Shared helpers: image and label loading, logging setup.

use std::path::Path;

use image::RgbImage;

use crate::core::errors::{RecognitionError, RecognitionResult};

/// Loads the image at `path` and converts it to 8-bit RGB.
///
/// Any format the `image` crate can open is accepted; alpha channels and
/// grayscale inputs are converted on the way in.
pub fn load_image(path: &Path) -> RecognitionResult<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Loads a label table: a JSON array of class names in model output order.
pub fn load_labels(path: &Path) -> RecognitionResult<Vec<String>> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        RecognitionError::config(format!(
            "{} is not a JSON string array: {}",
            path.display(),
            e
        ))
    })
}

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::RecognitionError;

    #[test]
    fn loads_and_converts_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([128])).save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.get_pixel(0, 0), &image::Rgb([128, 128, 128]));
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let result = load_image(Path::new("/definitely/not/a/frame.png"));
        assert!(matches!(result, Err(RecognitionError::ImageLoad(_))));
    }

    #[test]
    fn label_tables_are_json_string_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, br#"["brufen", "panadol"]"#).unwrap();
        assert_eq!(load_labels(&path).unwrap(), ["brufen", "panadol"]);

        std::fs::write(&path, b"{}").unwrap();
        assert!(matches!(
            load_labels(&path),
            Err(RecognitionError::Config { .. })
        ));
    }
}
