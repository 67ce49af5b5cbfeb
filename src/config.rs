//! # Configuration Module
//!
//! This module handles run configuration for music-insights: where the
//! inputs live, where outputs go, and the thresholds the analysis stages
//! apply.
//!
//! ## Sources
//!
//! - Input/output paths come from the command line (with environment
//!   variable fallbacks handled by clap) and end up in [`RuntimeConfig`].
//! - Analysis tunables live in [`AnalysisConfig`], read from a JSON file.
//!   Without an explicit `--config`, the platform config directory is
//!   consulted:
//!   - Linux: `~/.config/music-insights/config.json`
//!   - macOS: `~/Library/Application Support/music-insights/config.json`
//!   - Windows: `%APPDATA%\music-insights\config.json`
//!
//! Every field of the JSON file is optional; missing fields keep their
//! defaults.

use crate::analysis::Task;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default listening log input, relative to the working directory.
pub const DEFAULT_LOGS_PATH: &str = "listening_logs.csv";
/// Default song metadata input, relative to the working directory.
pub const DEFAULT_SONGS_PATH: &str = "songs_metadata.csv";
/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Returns the platform-appropriate location of the analysis config file.
///
/// Does not create anything; returns `None` if the platform has no config
/// directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("music-insights").join("config.json"))
}

/// Thresholds and limits used by the analysis stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// A listener qualifies for recommendations when sad plays / plays is
    /// strictly above this.
    pub sad_ratio_threshold: f64,
    /// Loyalty scores strictly above this are reported.
    pub loyalty_threshold: f64,
    /// First hour (inclusive) of the night-owl window.
    pub night_start_hour: u32,
    /// Hour (exclusive) the night-owl window ends.
    pub night_end_hour: u32,
    pub top_songs_limit: usize,
    pub recommendations_per_user: usize,
    /// Mood name counted as "sad".
    pub sad_mood: String,
    /// Mood name recommended to sad listeners.
    pub happy_mood: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sad_ratio_threshold: 0.5,
            loyalty_threshold: 0.8,
            night_start_hour: 0,
            night_end_hour: 5,
            top_songs_limit: 10,
            recommendations_per_user: 3,
            sad_mood: "Sad".to_string(),
            happy_mood: "Happy".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON for this struct,
    /// or carries out-of-range values.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid values in config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must exist. Otherwise the default location is used if
    /// a file is present there, and built-in defaults if not.
    ///
    /// # Errors
    ///
    /// Propagates [`AnalysisConfig::load`] failures.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using analysis config {}", path.display());
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                info!("Using analysis config {}", path.display());
                Self::load(&path)
            }
            _ => {
                debug!("No analysis config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject settings no stage could honour.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("sad_ratio_threshold", self.sad_ratio_threshold),
            ("loyalty_threshold", self.loyalty_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        if self.night_end_hour > 24 {
            bail!("night_end_hour must be at most 24, got {}", self.night_end_hour);
        }
        if self.night_start_hour >= self.night_end_hour {
            bail!(
                "night window is empty: start {} is not before end {}",
                self.night_start_hour,
                self.night_end_hour
            );
        }
        if self.sad_mood.is_empty() || self.happy_mood.is_empty() {
            bail!("mood names must not be empty");
        }
        Ok(())
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the listening log CSV
    pub logs_path: PathBuf,
    /// Path to the song metadata CSV
    pub songs_path: PathBuf,
    /// Directory receiving one CSV per task
    pub output_dir: PathBuf,
    /// Stages to run, in report order
    pub tasks: Vec<Task>,
    /// Run stages on the rayon pool instead of one after another
    pub parallel: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            logs_path: PathBuf::from(DEFAULT_LOGS_PATH),
            songs_path: PathBuf::from(DEFAULT_SONGS_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            tasks: Task::ALL.to_vec(),
            parallel: true,
        }
    }
}

impl RuntimeConfig {
    /// Create configuration with explicit input and output locations
    #[must_use]
    pub fn with_paths(logs_path: PathBuf, songs_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            logs_path,
            songs_path,
            output_dir,
            ..Self::default()
        }
    }

    /// Absolute form of the output directory, for reporting.
    ///
    /// # Errors
    ///
    /// Fails only if the current directory cannot be determined.
    pub fn absolute_output_dir(&self) -> Result<PathBuf> {
        let absolute = self
            .output_dir
            .absolutize()
            .with_context(|| format!("Cannot resolve output directory {}", self.output_dir.display()))?;
        Ok(absolute.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_songs_limit, 10);
        assert_eq!(config.recommendations_per_user, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "loyalty_threshold": 0.9, "top_songs_limit": 5 }}"#).unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();

        assert_eq!(config.loyalty_threshold, 0.9);
        assert_eq!(config.top_songs_limit, 5);
        assert_eq!(config.sad_ratio_threshold, 0.5);
        assert_eq!(config.happy_mood, "Happy");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "loyalty": 0.9 }}"#).unwrap();

        assert!(AnalysisConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let config = AnalysisConfig { loyalty_threshold: 1.5, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { night_start_hour: 5, night_end_hour: 5, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { night_end_hour: 25, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        assert!(AnalysisConfig::resolve(Some(Path::new("/nonexistent/config.json"))).is_err());
    }

    #[test]
    fn test_default_config_path_structure() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("music-insights/config.json"));
        }
    }

    #[test]
    fn test_runtime_config_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.logs_path, PathBuf::from("listening_logs.csv"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.tasks.len(), 6);

        let absolute = config.absolute_output_dir().unwrap();
        assert!(absolute.is_absolute());
        assert!(absolute.ends_with("output"));
    }
}
