// SPDX-License-Identifier: GPL-3.0-only

//! Safe Format - erase and reformat removable USB/SD media
//!
//! Only devices the classifier confirms as removable can be targeted.
//! Internal and fixed disks are never listed and never formatted.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod logging;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "safe-format")]
#[command(about = "List and reformat removable USB/SD media", long_about = None)]
struct Cli {
    /// Config file (default: per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List removable disks that can be formatted
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Erase a removable disk and create one FAT32/exFAT volume
    Format {
        /// Disk index as shown by `list`
        #[arg(long)]
        disk: u32,
        /// Volume label (trimmed and shortened to the filesystem limit)
        #[arg(long)]
        label: Option<String>,
        /// Skip the typed confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config);

    tracing::debug!("safe-format v{} with {:?}", env!("CARGO_PKG_VERSION"), config);

    match cli.command {
        Commands::List { json } => {
            commands::list(&config, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Format { disk, label, yes } => {
            commands::format(&config, disk, label.as_deref(), yes).await
        }
    }
}
