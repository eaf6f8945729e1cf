//! Drug Package Recognition Example
//!
//! Runs the full detect -> crop -> classify -> fuse pipeline on one or more
//! photos and prints the fused ranking for each.
//!
//! Usage:
//! ```
//! cargo run --example recognize -- --models-dir <dir> <image_paths>...
//! ```
//!
//! The models directory is expected to hold `detection.onnx`,
//! `classification.onnx`, `classification_150.onnx` and their label files.

use clap::Parser;
use pillscan::prelude::*;
use pillscan::utils::init_tracing;
use std::path::Path;
use tracing::{error, info};

/// Command-line arguments for the recognition example
#[derive(Parser)]
#[command(name = "recognize")]
#[command(about = "Drug Package Recognition Example - names the medication in each photo")]
struct Args {
    /// Directory holding the three model files and their labels
    #[arg(short, long, default_value = "models")]
    models_dir: String,

    /// Optional JSON file overriding the recognizer defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Image file paths to process
    #[arg(required = true)]
    images: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    init_tracing();

    let args = Args::parse();

    info!("Drug Package Recognition Example");

    let config = match &args.config {
        Some(path) => RecognizerConfig::from_json_file(path)?,
        None => RecognizerConfig::default(),
    };

    let recognizer = DrugRecognizer::new(config)?;
    let summary = recognizer.load_models(&DirModelSource::new(&args.models_dir))?;
    if !summary.fine {
        info!("Fine classifier unavailable, running coarse-only");
    }

    for (i, image_path) in args.images.iter().enumerate() {
        info!(
            "Processing image {} of {}: {}",
            i + 1,
            args.images.len(),
            image_path
        );
        match recognizer.recognize_path(Path::new(image_path)) {
            Ok(RecognitionOutcome::Recognized(result)) => {
                info!(
                    "   1. {} (confidence: {:.3}, source: {})",
                    result.top.class_name, result.top.confidence, result.top.source
                );
                for (rank, prediction) in result.ranked.iter().enumerate().skip(1) {
                    info!(
                        "   {}. {} (confidence: {:.3}, source: {})",
                        rank + 1,
                        prediction.class_name,
                        prediction.confidence,
                        prediction.source
                    );
                }
            }
            Ok(RecognitionOutcome::NoDetection) => {
                info!("   No package detected");
            }
            Ok(RecognitionOutcome::NoClassification { detection, .. }) => {
                info!(
                    "   Package detected (confidence: {:.3}) but no classifier named it",
                    detection.confidence
                );
            }
            Err(e) => {
                error!("Recognition failed for {}: {}", image_path, e);
                continue;
            }
        }
    }

    recognizer.dispose();
    info!("Example completed!");
    Ok(())
}
