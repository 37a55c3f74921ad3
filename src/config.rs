use crate::defaults;
use crate::error::{ParloError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub translation: TranslationConfig,
}

/// Audio capture and segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_ms: u32,
    pub vad_threshold: f32,
    pub silence_duration_ms: u32,
    pub min_speech_ms: u32,
    pub pre_roll_ms: u32,
    pub flush_on_stop: bool,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    pub engine: String,
    pub source_language: String,
    pub target_language: String,
    /// Override the engine's default HTTP endpoint.
    pub endpoint: Option<String>,
    /// API key for engines that need one. Usually supplied via the
    /// OPENAI_API_KEY environment variable instead of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_ms: defaults::FRAME_MS,
            vad_threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            pre_roll_ms: defaults::PRE_ROLL_MS,
            flush_on_stop: false,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            engine: defaults::DEFAULT_ENGINE.to_string(),
            source_language: defaults::DEFAULT_SOURCE_LANG.to_string(),
            target_language: defaults::DEFAULT_TARGET_LANG.to_string(),
            endpoint: None,
            api_key: None,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ParloError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ParloError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it doesn't exist.
    ///
    /// Only a missing file falls back to defaults; invalid TOML stays an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ParloError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PARLO_MODEL → stt.model
    /// - PARLO_LANGUAGE → stt.language
    /// - PARLO_AUDIO_DEVICE → audio.device
    /// - PARLO_ENGINE → translation.engine
    /// - PARLO_TARGET_LANG → translation.target_language
    /// - OPENAI_API_KEY → translation.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("PARLO_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("PARLO_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(device) = std::env::var("PARLO_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(engine) = std::env::var("PARLO_ENGINE")
            && !engine.is_empty()
        {
            self.translation.engine = engine;
        }

        if let Ok(target) = std::env::var("PARLO_TARGET_LANG")
            && !target.is_empty()
        {
            self.translation.target_language = target;
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.translation.api_key = Some(key);
        }

        self
    }

    /// Validate configuration values, naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.frame_ms == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.frame_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.audio.vad_threshold) {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.vad_threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if self.audio.silence_duration_ms < self.audio.frame_ms {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.silence_duration_ms".to_string(),
                message: "must be at least one frame long".to_string(),
            });
        }
        if self.translation.request_timeout_secs == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "translation.request_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/parlo/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("parlo")
            .join("config.toml")
    }
}
