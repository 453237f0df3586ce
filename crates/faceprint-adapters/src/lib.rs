//! Faceprint Adapters - External adapters for faceprint.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Model downloading and caching

pub mod fs;
pub mod models;

pub use fs::FsImageSource;
pub use models::{model_path, models_dir, set_models_dir};
