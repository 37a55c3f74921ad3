//! parlo binary entry point.

use clap::Parser;
use owo_colors::OwoColorize;
use parlo::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Suppress noisy JACK/ALSA warnings before any audio init
    #[cfg(feature = "cpal-audio")]
    parlo::audio::capture::suppress_audio_warnings();

    let result = if matches!(cli.command, Some(Commands::Devices)) {
        parlo::app::run_devices_command()
    } else {
        parlo::app::run(cli).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
