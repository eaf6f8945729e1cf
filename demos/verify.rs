//! Medication Verification Example
//!
//! Recognizes the package in a photo and checks it against the drug name a
//! medication schedule expects, using the same lenient matching the library
//! applies ("Brufen 30 Tablets" matches "brufen").
//!
//! Usage:
//! ```
//! cargo run --example verify -- --models-dir <dir> --expected <name> <image_path>
//! ```

use clap::Parser;
use pillscan::prelude::*;
use pillscan::utils::init_tracing;
use tracing::info;

/// Command-line arguments for the verification example
#[derive(Parser)]
#[command(name = "verify")]
#[command(about = "Medication Verification Example - checks a photo against an expected drug name")]
struct Args {
    /// Directory holding the three model files and their labels
    #[arg(short, long, default_value = "models")]
    models_dir: String,

    /// Drug name the schedule expects
    #[arg(short, long)]
    expected: String,

    /// Image file path to verify
    image: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    init_tracing();

    let args = Args::parse();

    info!("Medication Verification Example");

    let recognizer = DrugRecognizer::new(RecognizerConfig::default())?;
    recognizer.load_models(&DirModelSource::new(&args.models_dir))?;

    let outcome = recognizer.verify_path(&args.image, &args.expected)?;
    match &outcome.recognized_name {
        Some(name) => info!("Recognized: {} (confidence: {:.3})", name, outcome.confidence),
        None => info!("Nothing recognized in {}", args.image),
    }
    if outcome.matched {
        info!("MATCH: this looks like {}", args.expected);
    } else {
        info!("NO MATCH: expected {}", args.expected);
    }

    recognizer.dispose();
    Ok(())
}
