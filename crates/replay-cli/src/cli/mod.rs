//! CLI for the recording replay engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use replay_core::config;

use commands::{run_cameras, run_chain, run_classify, run_probe, run_segments, run_watch};

/// Operator tooling around the replay engine.
#[derive(Debug, Parser)]
#[command(name = "replay")]
#[command(about = "Inspect recorded segments, stream health and playback chaining", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List cameras known to the recording API.
    Cameras,

    /// List a camera's segments, oldest first, with recording gaps.
    Segments {
        /// Camera identifier.
        camera: String,
        /// Print the raw list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show what would play after a segment ends.
    Chain {
        /// Camera identifier.
        camera: String,
        /// Segment identifier.
        segment_id: i64,
        /// Decide as if auto-play were switched off.
        #[arg(long)]
        no_autoplay: bool,
    },

    /// Probe a segment stream (HEAD) and validate it.
    Probe {
        /// Camera identifier.
        camera: String,
        /// Segment filename as listed by `segments`.
        filename: String,
    },

    /// Poll a camera's segment list and report changes.
    Watch {
        /// Camera identifier.
        camera: String,
        /// Stop after N polls (default: run until interrupted).
        #[arg(long, value_name = "N")]
        count: Option<u32>,
    },

    /// Classify an HTTP status the way the engine does.
    Classify {
        /// HTTP status code.
        status: u16,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Classification is offline; everything else needs the config.
        if let CliCommand::Classify { status } = cli.command {
            return run_classify(status);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Cameras => run_cameras(&cfg).await?,
            CliCommand::Segments { camera, json } => run_segments(&cfg, &camera, json).await?,
            CliCommand::Chain {
                camera,
                segment_id,
                no_autoplay,
            } => run_chain(&cfg, &camera, segment_id, !no_autoplay).await?,
            CliCommand::Probe { camera, filename } => run_probe(&cfg, &camera, &filename).await?,
            CliCommand::Watch { camera, count } => run_watch(&cfg, &camera, count).await?,
            CliCommand::Classify { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
