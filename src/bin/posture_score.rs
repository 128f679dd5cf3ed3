//! posture_score - score a single keypoint frame
//!
//! Input is a JSON array of 25 BODY_25 slots, each `null` or
//! `{"x": .., "y": .., "confidence": ..}` in pixel coordinates.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use posture_sentinel::{KeypointFrame, PostureScorer, ScoringConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Keypoint frame JSON file, or `-` for stdin.
    input: PathBuf,
    /// Posture sensitivity in [0.1, 1.0]; out-of-range values are clamped.
    #[arg(long, default_value_t = 0.5)]
    sensitivity: f32,
    /// Minimum keypoint confidence.
    #[arg(long)]
    confidence_threshold: Option<f32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let raw = if args.input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| anyhow!("failed to read {}: {}", args.input.display(), e))?
    };
    let frame: KeypointFrame =
        serde_json::from_str(&raw).map_err(|e| anyhow!("invalid keypoint frame: {}", e))?;

    let mut config = ScoringConfig::default().with_sensitivity(args.sensitivity);
    if let Some(threshold) = args.confidence_threshold {
        config.confidence_threshold = threshold.clamp(0.0, 1.0);
    }

    let verdict = PostureScorer::new().evaluate(&frame, &config);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
