//! TOML configuration file loading
//!
//! Supports `~/.config/lectern/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LecternConfigFile {
    /// Data directory override
    #[serde(default)]
    pub data_dir: Option<String>,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Reader configuration
    #[serde(default)]
    pub reader: ReaderFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: Option<String>,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable speech capture and synthesis
    pub enabled: Option<bool>,

    /// Preferred voice language tag (e.g. "en-IN")
    pub language: Option<String>,

    /// Speech rate multiplier
    pub rate: Option<f64>,

    /// Speech pitch multiplier
    pub pitch: Option<f64>,
}

/// Reader configuration
#[derive(Debug, Default, Deserialize)]
pub struct ReaderFileConfig {
    /// Character budget per page for the plain-text engine
    pub page_chars: Option<usize>,

    /// Default viewport width in pixels
    pub viewport_width: Option<u32>,
}

/// Load the TOML config file from `LECTERN_CONFIG` or the standard path
///
/// Returns `LecternConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> LecternConfigFile {
    let Some(path) = config_file_path() else {
        return LecternConfigFile::default();
    };

    if !path.exists() {
        return LecternConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LecternConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LecternConfigFile::default()
        }
    }
}

/// Return the config file path: `LECTERN_CONFIG` or `~/.config/lectern/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LECTERN_CONFIG") {
        return Some(PathBuf::from(path));
    }
    directories::BaseDirs::new().map(|d| d.config_dir().join("lectern").join("config.toml"))
}
