//! Terminal rendering for the capture loop.
//!
//! Translations go to stdout so they can be piped; everything else
//! (status, timings, warnings) goes to stderr.

use crate::cycle::{CycleFailure, CycleReport};
use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// How much to print per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Translations only (stdout).
    Quiet,
    /// Translations plus transcript and status lines.
    Normal,
    /// Everything, including per-stage timings.
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Clear the current terminal line (replaces the listening indicator).
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Show that the loop is waiting for speech.
pub fn render_listening(verbosity: Verbosity) {
    if verbosity == Verbosity::Quiet {
        return;
    }
    eprint!("{DIM}listening...{RESET}");
    io::stderr().flush().ok();
}

/// Print the startup banner with the resolved pipeline settings.
#[allow(clippy::too_many_arguments)]
pub fn render_banner(
    version: &str,
    model: &str,
    engine: &str,
    source_lang: &str,
    target_lang: &str,
    device: &str,
    backend: &str,
    verbosity: Verbosity,
) {
    if verbosity == Verbosity::Quiet {
        return;
    }
    eprintln!("{DIM}parlo v{version} ({backend}){RESET}");
    eprintln!("{DIM}model: {model}  engine: {engine}  {source_lang} -> {target_lang}{RESET}");
    eprintln!("{DIM}device: {device}{RESET}");
}

/// Render one completed cycle.
///
/// The translation (when present) is the only stdout line, so
/// `parlo --quiet | some-consumer` sees translations and nothing else.
pub fn render_report(report: &CycleReport, verbosity: Verbosity) {
    clear_line();

    let transcript = report.transcript.text();
    if transcript.is_empty() {
        if verbosity != Verbosity::Quiet {
            eprintln!(
                "{DIM}(no speech recognized, {:.1}s audio){RESET}",
                report.audio_ms as f64 / 1000.0
            );
        }
        return;
    }

    if verbosity != Verbosity::Quiet {
        eprintln!("{DIM}>{RESET} {transcript}");
    }

    match (&report.translation, &report.translation_error) {
        (Some(translation), _) => {
            println!("{translation}");
            io::stdout().flush().ok();
        }
        (None, Some(error)) => {
            eprintln!("{YELLOW}translation failed: {error}{RESET}");
        }
        (None, None) => {}
    }

    // Timings accompany every reported cycle, not just verbose runs
    if verbosity != Verbosity::Quiet {
        eprintln!(
            "{DIM}audio {:.1}s  persist {}ms  stt {}ms  translate {}ms{RESET}",
            report.audio_ms as f64 / 1000.0,
            report.persist_ms,
            report.transcribe_ms,
            report.translate_ms,
        );
    }
}

/// Render a capture failure the loop continues after.
pub fn render_cycle_error(error: &crate::error::ParloError, verbosity: Verbosity) {
    clear_line();
    if verbosity == Verbosity::Quiet {
        return;
    }
    eprintln!("{RED}cycle failed: {error}{RESET}");
}

/// Render a failed processing cycle with the stage timings it got through.
pub fn render_cycle_failure(failure: &CycleFailure, verbosity: Verbosity) {
    clear_line();
    if verbosity == Verbosity::Quiet {
        return;
    }
    eprintln!("{RED}cycle failed: {}{RESET}", failure.error);
    eprintln!(
        "{DIM}audio {:.1}s  persist {}ms  stt {}ms{RESET}",
        failure.audio_ms as f64 / 1000.0,
        failure.persist_ms,
        failure.transcribe_ms,
    );
}

/// Render the shutdown line.
pub fn render_shutdown(cycles: u64, verbosity: Verbosity) {
    clear_line();
    if verbosity == Verbosity::Quiet {
        return;
    }
    eprintln!("{GREEN}done{RESET} {DIM}({cycles} utterances){RESET}");
}
