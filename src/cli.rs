//! Command-line interface for parlo
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Continuous speech translation from the microphone
#[derive(Parser, Debug)]
#[command(
    name = "parlo",
    version,
    about = "Continuous speech translation from the microphone"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output; print translations only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (per-stage timings)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (substring match against device names)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to a ggml Whisper model file
    #[arg(long, value_name = "PATH")]
    pub model: Option<String>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, de, es
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Translation engine (gpt, libre, marian)
    #[arg(long, value_name = "ENGINE")]
    pub engine: Option<String>,

    /// Source language for translation
    #[arg(long, value_name = "LANG")]
    pub source_lang: Option<String>,

    /// Target language for translation
    #[arg(long, value_name = "LANG")]
    pub target_lang: Option<String>,

    /// Read audio from a WAV file instead of the microphone
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Exit after the first translated utterance
    #[arg(long)]
    pub once: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_no_args() {
        let cli = Cli::try_parse_from(["parlo"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.once);
    }

    #[test]
    fn test_parses_devices_subcommand() {
        let cli = Cli::try_parse_from(["parlo", "devices"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn test_parses_overrides() {
        let cli = Cli::try_parse_from([
            "parlo",
            "--model",
            "models/ggml-small.bin",
            "--language",
            "de",
            "--engine",
            "libre",
            "--source-lang",
            "de",
            "--target-lang",
            "en",
            "--device",
            "USB",
            "--once",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("models/ggml-small.bin"));
        assert_eq!(cli.language.as_deref(), Some("de"));
        assert_eq!(cli.engine.as_deref(), Some("libre"));
        assert_eq!(cli.source_lang.as_deref(), Some("de"));
        assert_eq!(cli.target_lang.as_deref(), Some("en"));
        assert_eq!(cli.device.as_deref(), Some("USB"));
        assert!(cli.once);
    }

    #[test]
    fn test_parses_input_file() {
        let cli = Cli::try_parse_from(["parlo", "--input", "speech.wav"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("speech.wav")));
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["parlo", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::try_parse_from(["parlo", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_is_global() {
        let cli = Cli::try_parse_from(["parlo", "devices", "--config", "/tmp/parlo.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/parlo.toml")));
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["parlo", "--fan-out"]).is_err());
    }
}
