//! Embed command - extract embeddings from images.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use faceprint_adapters::{model_path, set_models_dir, FsImageSource};
use faceprint_core::{
    EmbeddingRecord, FaceEmbedder, ImageSource, LoadState, ProgressEvent, ProgressSink,
    RecordOutput,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for records.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Shared arguments for embedding extraction.
#[derive(Args, Clone)]
pub struct EmbedArgs {
    /// Files or directories to embed
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Explicit weight file (overrides models directory lookup)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl EmbedArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        // Recursive: config applies only if CLI --recursive not passed
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Model resolution: CLI > config
        if args.model.is_none() {
            args.model.clone_from(&config.model.path);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.model.dir);
        }

        // Output format: CLI > config (accessor provides fallback)
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the embed command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct EmbedResult {
    /// Number of images embedded.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Loads the embedder for the resolved weight file, applying any
/// models-dir override first.
///
/// # Errors
///
/// Returns an error when no weight file can be resolved or the model
/// fails to load.
pub fn load_embedder(model: Option<&PathBuf>, models_dir: Option<&PathBuf>) -> Result<FaceEmbedder> {
    if let Some(dir) = models_dir {
        debug!("Using custom models directory: {}", dir.display());
        set_models_dir(Some(dir.clone()));
    }

    let weights = match model {
        Some(path) => path.clone(),
        None => model_path("faceprint").context("Unknown model 'faceprint'")?,
    };

    if !weights.exists() {
        anyhow::bail!(
            "Model file not found: {}. Run `faceprint models fetch` or pass --model.",
            weights.display()
        );
    }

    let embedder = FaceEmbedder::load(&weights);
    match embedder.load_state() {
        LoadState::Loaded => Ok(embedder),
        LoadState::Failed { reason } => anyhow::bail!("Model failed to load: {reason}"),
        LoadState::Released => unreachable!("freshly loaded embedder cannot be released"),
    }
}

/// Run the embed command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &EmbedArgs) -> Result<EmbedResult> {
    info!("Running embed command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let embedder = load_embedder(args.model.as_ref(), args.models_dir.as_ref())?;

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    // Determine if we should show progress
    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();

    let mut processed = 0;
    let mut skipped = 0;
    let mut all_records = Vec::new();

    for (index, item) in source.images().enumerate() {
        let info = match item {
            Ok(info) => info,
            Err(e) => {
                warn!("Skipping unreadable image: {e:#}");
                skipped += 1;
                progress.on_event(ProgressEvent::Skipped {
                    path: String::from("<unreadable>"),
                    reason: format!("{e:#}"),
                });
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: info.path.clone(),
            index,
            total,
        });

        let embedding = match embedder.extract_features(&info.image) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Extraction failed for {}: {e}", info.path);
                skipped += 1;
                progress.on_event(ProgressEvent::Skipped {
                    path: info.path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let record = EmbeddingRecord {
            dimensions: info.dimensions(),
            path: info.path,
            timestamp: iso_timestamp(),
            embedding,
        };

        progress.on_event(ProgressEvent::Completed {
            record: record.clone(),
        });

        match args.format() {
            OutputFormat::Jsonl => output.write(&record)?,
            OutputFormat::Json => all_records.push(record),
        }

        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_records, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if skipped > 0 {
        ExitCode::Failures
    } else {
        ExitCode::Success
    };

    Ok(EmbedResult {
        processed,
        skipped,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
pub fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
