//! CLI argument definitions for the Strata binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Strata — splits chat transcripts into topics and extracts the sentences
/// that best represent each one.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about)]
pub struct CliArgs {
    /// Path to the chat-export JSON file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Path for the segmented output JSON.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory containing model.onnx and tokenizer.json.
    #[arg(short = 'm', long = "model-dir")]
    pub model_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > STRATA_CONFIG env var > ~/.strata/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("STRATA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the embedding model directory.
    ///
    /// Priority: --model-dir flag > config file value. `None` selects the
    /// deterministic mock backend.
    pub fn resolve_model_dir(&self, config_dir: Option<&str>) -> Option<PathBuf> {
        if let Some(ref dir) = self.model_dir {
            return Some(dir.clone());
        }
        config_dir.map(PathBuf::from)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".strata").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".strata").join("config.toml");
    }
    PathBuf::from("config.toml")
}
