//! Configuration management for Lectern

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Placeholder value shipped in sample configs; treated the same as unset.
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Lectern configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (library database)
    pub data_dir: PathBuf,

    /// Credential for the answering backend (from `GEMINI_API_KEY`)
    pub gemini_api_key: String,

    /// Model identifier for answering calls
    pub model: String,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Reader configuration
    pub reader: ReaderConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable speech capture and synthesis
    pub enabled: bool,

    /// Preferred voice language tag (e.g. "en-IN")
    pub language: String,

    /// Speech rate multiplier
    pub rate: f64,

    /// Speech pitch multiplier
    pub pitch: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-IN".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Reader configuration
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Character budget per page for the plain-text engine
    pub page_chars: usize,

    /// Default viewport width in pixels for page rendering
    pub viewport_width: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            page_chars: 1800,
            viewport_width: 800,
        }
    }
}

impl Config {
    /// Load configuration (env > toml file > default)
    ///
    /// # Errors
    ///
    /// Returns error if the answering-backend credential is missing
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with explicit voice disable option
    ///
    /// # Errors
    ///
    /// Returns error if the answering-backend credential is missing
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file();

        // The credential comes from the environment only, never the file.
        // Missing or placeholder keys fail startup before any subsystem runs.
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| usable_api_key(key))
            .ok_or_else(|| {
                Error::Config(
                    "GEMINI_API_KEY is not set; export a Gemini API key before starting"
                        .to_string(),
                )
            })?;

        let model = std::env::var("LECTERN_MODEL")
            .ok()
            .or(fc.llm.model)
            .unwrap_or_else(|| "gemini-2.5-flash".to_string());

        let voice_default = VoiceConfig::default();
        let voice_enabled = if disable_voice {
            false
        } else {
            std::env::var("LECTERN_DISABLE_VOICE")
                .ok()
                .map(|v| !(v == "1" || v.eq_ignore_ascii_case("true")))
                .or(fc.voice.enabled)
                .unwrap_or(voice_default.enabled)
        };
        let voice = VoiceConfig {
            enabled: voice_enabled,
            language: std::env::var("LECTERN_VOICE_LANG")
                .ok()
                .or(fc.voice.language)
                .unwrap_or(voice_default.language),
            rate: fc.voice.rate.unwrap_or(voice_default.rate),
            pitch: fc.voice.pitch.unwrap_or(voice_default.pitch),
        };

        if disable_voice {
            tracing::info!("voice explicitly disabled via --no-voice");
        }

        let reader_default = ReaderConfig::default();
        let reader = ReaderConfig {
            page_chars: std::env::var("LECTERN_PAGE_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.reader.page_chars)
                .unwrap_or(reader_default.page_chars),
            viewport_width: std::env::var("LECTERN_VIEWPORT_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.reader.viewport_width)
                .unwrap_or(reader_default.viewport_width),
        };

        // Data directory (~/.local/share/lectern on Linux)
        let data_dir = std::env::var("LECTERN_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .or(fc.data_dir.map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        std::fs::create_dir_all(&data_dir).ok();

        Ok(Self {
            data_dir,
            gemini_api_key,
            model,
            voice,
            reader,
        })
    }

    /// Path of the library database inside the data directory
    #[must_use]
    pub fn library_path(&self) -> PathBuf {
        self.data_dir.join("library.db")
    }
}

/// Whether a credential value is usable (set and not the sample placeholder)
fn usable_api_key(key: &str) -> bool {
    !key.trim().is_empty() && key != PLACEHOLDER_API_KEY
}

/// Default data directory: `~/.local/share/lectern/`
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/lectern"),
        |d| d.data_dir().join("lectern"),
    )
}
