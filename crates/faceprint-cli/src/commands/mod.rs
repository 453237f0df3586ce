//! CLI command definitions and handlers.

pub mod compare;
pub mod embed;
pub mod models;

use clap::{Parser, Subcommand};

/// Faceprint - Face embedding extraction tool
#[derive(Parser)]
#[command(name = "faceprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared embed arguments (paths, model, output flags).
    #[command(flatten)]
    pub embed: embed::EmbedArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Extract embeddings from images
    Embed(embed::EmbedArgs),
    /// Compare two face images by embedding similarity
    Compare(compare::CompareArgs),
    /// Manage ML models
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// All images processed (or faces matched).
    Success,
    /// Some images failed to embed, or the faces did not match.
    Failures,
    /// Hard error before any processing.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::from(0),
            ExitCode::Failures => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
