//! Compare command - cosine similarity between two face images.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::embed::load_embedder;
use super::ExitCode;
use crate::config::AppConfig;

/// Similarity above which two embeddings count as the same face.
const DEFAULT_THRESHOLD: f32 = 0.75;

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Arguments for the compare command.
#[derive(Args, Clone)]
pub struct CompareArgs {
    /// First image
    pub image_a: PathBuf,

    /// Second image
    pub image_b: PathBuf,

    /// Similarity threshold for a match (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f32>,

    /// Explicit weight file (overrides models directory lookup)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl CompareArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.threshold = args.threshold.or(config.compare.threshold);
        if args.model.is_none() {
            args.model.clone_from(&config.model.path);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.model.dir);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        args
    }

    fn threshold(&self) -> f32 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// JSON report printed by the compare command.
#[derive(Debug, Serialize)]
struct ComparisonReport {
    image_a: String,
    image_b: String,
    similarity: f32,
    threshold: f32,
    matched: bool,
}

/// Run the compare command.
///
/// # Errors
///
/// Returns an error if either image cannot be read or the model is
/// unavailable.
pub fn run(args: &CompareArgs) -> Result<ExitCode> {
    let embedder = load_embedder(args.model.as_ref(), args.models_dir.as_ref())?;

    let image_a = image::open(&args.image_a)
        .with_context(|| format!("Failed to open image: {}", args.image_a.display()))?;
    let image_b = image::open(&args.image_b)
        .with_context(|| format!("Failed to open image: {}", args.image_b.display()))?;

    let embedding_a = embedder
        .extract_features(&image_a)
        .with_context(|| format!("Failed to embed {}", args.image_a.display()))?;
    let embedding_b = embedder
        .extract_features(&image_b)
        .with_context(|| format!("Failed to embed {}", args.image_b.display()))?;

    let similarity = embedding_a.cosine_similarity(&embedding_b);
    let threshold = args.threshold();
    let matched = similarity > threshold;

    info!("Cosine similarity: {similarity:.4} (threshold {threshold})");

    let report = ComparisonReport {
        image_a: args.image_a.to_string_lossy().into_owned(),
        image_b: args.image_b.to_string_lossy().into_owned(),
        similarity,
        threshold,
        matched,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(if matched {
        ExitCode::Success
    } else {
        ExitCode::Failures
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_bounds() {
        assert!(parse_threshold("0.0").is_ok());
        assert!(parse_threshold("1.0").is_ok());
        assert!(parse_threshold("0.75").is_ok());
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_threshold_default() {
        let args = CompareArgs {
            image_a: "a.png".into(),
            image_b: "b.png".into(),
            threshold: None,
            model: None,
            models_dir: None,
            pretty: false,
        };
        assert!((args.threshold() - DEFAULT_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_threshold_applied_when_cli_absent() {
        let args = CompareArgs {
            image_a: "a.png".into(),
            image_b: "b.png".into(),
            threshold: None,
            model: None,
            models_dir: None,
            pretty: false,
        };
        let mut config = AppConfig::default();
        config.compare.threshold = Some(0.9);

        let merged = CompareArgs::with_config(args, &config);
        assert_eq!(merged.threshold, Some(0.9));
    }

    #[test]
    fn test_cli_threshold_wins_over_config() {
        let args = CompareArgs {
            image_a: "a.png".into(),
            image_b: "b.png".into(),
            threshold: Some(0.6),
            model: None,
            models_dir: None,
            pretty: false,
        };
        let mut config = AppConfig::default();
        config.compare.threshold = Some(0.9);

        let merged = CompareArgs::with_config(args, &config);
        assert_eq!(merged.threshold, Some(0.6));
    }
}
