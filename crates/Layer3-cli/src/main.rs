//! Loom CLI - Main entry point

mod commands;
mod counter;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{parse_assignment, RunOptions};
use loom_core::{HostConfig, SettingsStorage};
use loom_foundation::{JsonSettingsStorage, JsonStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loom - plugin host for document editors
#[derive(Parser, Debug)]
#[command(name = "loom")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a document, boot the plugins and replay interactions
    Run {
        /// Document file (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Emit settingsOpened and print the rendered settings columns
        #[arg(long)]
        open_settings: bool,

        /// Element id to click (repeatable)
        #[arg(long = "click")]
        clicks: Vec<String>,

        /// Call a settings setter: <setter>=<value> (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,

        /// Write the document with updated plugin storage here
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print the plugin storage stored in a document
    Inspect {
        /// Document file (JSON)
        #[arg(long)]
        document: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command {
        Command::Run {
            document,
            open_settings,
            clicks,
            sets,
            save,
        } => {
            let mut config = HostConfig::load().context("Failed to load host config")?;
            if args.debug {
                config = config.debug_events(true);
            }

            let store = JsonStore::current_project().context("Failed to open project store")?;
            let settings: Arc<dyn SettingsStorage> = Arc::new(
                JsonSettingsStorage::open(store, config.settings_file.clone())
                    .context("Failed to open settings storage")?,
            );

            let options = RunOptions {
                document,
                open_settings,
                clicks,
                sets,
                save,
            };
            let result = commands::run(config, settings, &options).await?;
            print!("{}", commands::describe_storage(&result)?);
        }
        Command::Inspect { document } => {
            commands::inspect(&document).await?;
        }
    }

    Ok(())
}
