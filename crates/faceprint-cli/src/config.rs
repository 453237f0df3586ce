//! Configuration file support for faceprint.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/faceprint/config.toml` (lowest priority)
//! - Project-local: `.faceprint.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Model settings.
    pub model: ModelConfig,
    /// Comparison settings.
    pub compare: CompareConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
    /// Explicit weight file path, bypassing the models directory.
    pub path: Option<PathBuf>,
}

/// Comparison configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Cosine similarity threshold for a match (0.0-1.0).
    pub threshold: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/faceprint/config.toml`
    /// 2. Project-local: `.faceprint.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        // Validate merged config
        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.compare.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("compare.threshold must be 0.0-1.0, got {t}"));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!("output.format must be 'json' or 'jsonl', got '{f}'"));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.model.dir = other.model.dir.or_else(|| self.model.dir.take());
        self.model.path = other.model.path.or_else(|| self.model.path.take());

        self.compare.threshold = other.compare.threshold.or(self.compare.threshold);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("faceprint").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.faceprint.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".faceprint.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.general.recursive.is_none());
        assert!(config.compare.threshold.is_none());
        assert!(config.model.dir.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: AppConfig = toml::from_str(toml).expect("parse empty config");
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true

[model]
dir = '/opt/models'

[compare]
threshold = 0.8

[output]
format = 'json'
pretty = true
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");
        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.model.dir, Some(PathBuf::from("/opt/models")));
        assert_eq!(config.compare.threshold, Some(0.8));
        assert_eq!(config.output.format.as_deref(), Some("json"));
        assert_eq!(config.output.pretty, Some(true));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = AppConfig::default();
        config.compare.threshold = Some(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let mut config = AppConfig::default();
        config.output.format = Some("yaml".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = AppConfig::default();
        base.compare.threshold = Some(0.7);
        base.output.pretty = Some(false);

        let mut overlay = AppConfig::default();
        overlay.compare.threshold = Some(0.9);

        base.merge(overlay);
        assert_eq!(base.compare.threshold, Some(0.9));
        // Untouched values survive the merge
        assert_eq!(base.output.pretty, Some(false));
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".faceprint.toml"), "").unwrap();

        let found = find_config_in_parents(&nested).expect("should find config");
        assert_eq!(found, dir.path().join(".faceprint.toml"));
    }
}
