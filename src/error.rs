//! Error types for parlo.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParloError {
    // Configuration errors (fatal, startup only)
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio device errors
    #[error("Audio device not found: {device}")]
    DeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    #[error("Audio device read failed: {message}")]
    DeviceRead { message: String },

    // Segment persistence errors (cycle-scoped)
    #[error("Failed to persist audio segment: {message}")]
    Persist { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Translation errors (cycle-scoped, transcript still reported)
    #[error("Translation failed: {message}")]
    Translation { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ParloError {
    /// True for errors that abort only the current cycle.
    ///
    /// Everything else is fatal at startup: device open, model load,
    /// translator construction and configuration failures.
    pub fn is_cycle_scoped(&self) -> bool {
        matches!(
            self,
            ParloError::DeviceRead { .. }
                | ParloError::Persist { .. }
                | ParloError::Transcription { .. }
                | ParloError::Translation { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ParloError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = ParloError::ConfigInvalidValue {
            key: "audio.sample_rate".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for audio.sample_rate: must be positive"
        );
    }

    #[test]
    fn test_device_not_found_display() {
        let error = ParloError::DeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_persist_display() {
        let error = ParloError::Persist {
            message: "disk full".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to persist audio segment: disk full"
        );
    }

    #[test]
    fn test_transcription_model_not_found_display() {
        let error = ParloError::TranscriptionModelNotFound {
            path: "/models/ggml-base.bin".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription model not found at /models/ggml-base.bin"
        );
    }

    #[test]
    fn test_translation_display() {
        let error = ParloError::Translation {
            message: "server returned 500".to_string(),
        };
        assert_eq!(error.to_string(), "Translation failed: server returned 500");
    }

    #[test]
    fn test_cycle_scoped_classification() {
        assert!(
            ParloError::DeviceRead {
                message: "overrun".into()
            }
            .is_cycle_scoped()
        );
        assert!(
            ParloError::Persist {
                message: "disk full".into()
            }
            .is_cycle_scoped()
        );
        assert!(
            ParloError::Transcription {
                message: "inference".into()
            }
            .is_cycle_scoped()
        );
        assert!(
            ParloError::Translation {
                message: "timeout".into()
            }
            .is_cycle_scoped()
        );

        assert!(
            !ParloError::DeviceNotFound {
                device: "default".into()
            }
            .is_cycle_scoped()
        );
        assert!(
            !ParloError::ConfigInvalidValue {
                key: "translation.engine".into(),
                message: "unknown".into()
            }
            .is_cycle_scoped()
        );
        assert!(
            !ParloError::TranscriptionModelNotFound {
                path: "/missing".into()
            }
            .is_cycle_scoped()
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ParloError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: ParloError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ParloError>();
        assert_sync::<ParloError>();
    }
}
