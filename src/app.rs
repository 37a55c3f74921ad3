//! Application entry point.
//!
//! Orchestrates the complete loop:
//! capture → segment → persist → transcribe → translate → render

use crate::artifact::SegmentPersister;
use crate::audio::listener::Listener;
use crate::audio::segmenter::SegmenterConfig;
use crate::audio::source::FrameSource;
use crate::audio::wav::WavFrameSource;
use crate::cli::Cli;
use crate::config::Config;
use crate::cycle::CycleOrchestrator;
use crate::defaults;
use crate::error::{ParloError, Result};
use crate::output::{self, Verbosity};
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use crate::translate::factory::create_translator;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "cpal-audio")]
use crate::audio::capture::{CpalFrameSource, list_devices};

/// Resolve the effective configuration.
///
/// Precedence, lowest to highest: file, environment, CLI flags.
/// An explicit `--config` path must exist; the default path may not.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    }
    .with_env_overrides();

    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(model) = &cli.model {
        config.stt.model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.stt.language = language.clone();
    }
    if let Some(engine) = &cli.engine {
        config.translation.engine = engine.clone();
    }
    if let Some(source) = &cli.source_lang {
        config.translation.source_language = source.clone();
    }
    if let Some(target) = &cli.target_lang {
        config.translation.target_language = target.clone();
    }

    config.validate()?;
    Ok(config)
}

fn segmenter_config(config: &Config, file_input: bool) -> SegmenterConfig {
    SegmenterConfig {
        silence_duration_ms: config.audio.silence_duration_ms,
        min_speech_ms: config.audio.min_speech_ms,
        pre_roll_ms: config.audio.pre_roll_ms,
        // A file that ends mid-utterance should still produce output
        flush_on_stop: config.audio.flush_on_stop || file_input,
    }
}

fn build_orchestrator(config: &Config) -> Result<CycleOrchestrator> {
    let transcriber = WhisperTranscriber::new(WhisperConfig {
        model_path: PathBuf::from(&config.stt.model),
        language: config.stt.language.clone(),
        threads: None,
    })?;
    let translator = create_translator(&config.translation)?;

    Ok(CycleOrchestrator::new(
        SegmentPersister::in_temp_dir(),
        Box::new(transcriber),
        translator,
        config.translation.source_language.clone(),
        config.translation.target_language.clone(),
    ))
}

/// Run the capture loop until the source ends or Ctrl-C.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);

    let orchestrator = build_orchestrator(&config)?;

    output::render_banner(
        &crate::version_string(),
        orchestrator.model_name(),
        orchestrator.translator_name(),
        &config.translation.source_language,
        &config.translation.target_language,
        config.audio.device.as_deref().unwrap_or("default"),
        defaults::gpu_backend(),
        verbosity,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    match &cli.input {
        Some(path) => {
            let source =
                WavFrameSource::from_path(path, config.audio.sample_rate, config.audio.frame_ms)?;
            let listener = Listener::new(
                source,
                config.audio.vad_threshold,
                segmenter_config(&config, true),
                shutdown,
            );
            run_loop(listener, orchestrator, cli.once, verbosity).await
        }
        None => run_live(&config, orchestrator, shutdown, cli.once, verbosity).await,
    }
}

#[cfg(feature = "cpal-audio")]
async fn run_live(
    config: &Config,
    orchestrator: CycleOrchestrator,
    shutdown: Arc<AtomicBool>,
    once: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let source = CpalFrameSource::new(
        config.audio.device.as_deref(),
        config.audio.sample_rate,
        config.audio.frame_ms,
    )?;
    let listener = Listener::new(
        source,
        config.audio.vad_threshold,
        segmenter_config(config, false),
        shutdown,
    );
    run_loop(listener, orchestrator, once, verbosity).await
}

#[cfg(not(feature = "cpal-audio"))]
async fn run_live(
    _config: &Config,
    _orchestrator: CycleOrchestrator,
    _shutdown: Arc<AtomicBool>,
    _once: bool,
    _verbosity: Verbosity,
) -> Result<()> {
    Err(ParloError::AudioCapture {
        message: concat!(
            "Microphone capture not enabled in this build. ",
            "Rebuild with: cargo build --release --features cpal-audio, ",
            "or use --input to read from a WAV file."
        )
        .to_string(),
    })
}

/// Capture utterances and feed them through the cycle orchestrator.
///
/// Capture blocks, so each `listen_until_silence` call runs on a blocking
/// thread and hands the listener back when it returns. Cycle-scoped failures
/// are rendered and the loop continues; anything else ends the run.
async fn run_loop<S: FrameSource + 'static>(
    mut listener: Listener<S>,
    mut orchestrator: CycleOrchestrator,
    once: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let mut cycles: u64 = 0;

    loop {
        output::render_listening(verbosity);

        let (returned, result) = tokio::task::spawn_blocking(move || {
            let mut listener = listener;
            let result = listener.listen_until_silence();
            (listener, result)
        })
        .await
        .map_err(|e| ParloError::Other(format!("capture task panicked: {e}")))?;
        listener = returned;

        let segment = match result {
            Ok(Some(segment)) => segment,
            Ok(None) => break,
            Err(e) if e.is_cycle_scoped() => {
                output::render_cycle_error(&e, verbosity);
                if once {
                    break;
                }
                continue;
            }
            Err(e) => {
                listener.close()?;
                return Err(e);
            }
        };

        match orchestrator.process_segment(segment).await {
            Ok(report) => {
                cycles += 1;
                output::render_report(&report, verbosity);
            }
            Err(failure) if failure.is_cycle_scoped() => {
                output::render_cycle_failure(&failure, verbosity);
                if once {
                    break;
                }
                continue;
            }
            Err(failure) => {
                listener.close()?;
                return Err(failure.error);
            }
        }

        if once {
            break;
        }
    }

    listener.close()?;
    output::render_shutdown(cycles, verbosity);
    Ok(())
}

/// List capture devices for the `devices` subcommand.
#[cfg(feature = "cpal-audio")]
pub fn run_devices_command() -> Result<()> {
    let devices = list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found.");
        std::process::exit(1);
    }
    for (i, name) in devices.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
pub fn run_devices_command() -> Result<()> {
    Err(ParloError::AudioCapture {
        message: "Device listing requires the cpal-audio feature.".to_string(),
    })
}
