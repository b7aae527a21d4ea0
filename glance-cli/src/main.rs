//! # glance-cli
//!
//! Demo and inspection CLI for glance-sync.
//!
//! ## Commands
//!
//! - `demo`: run an in-process host/companion pair over the memory hub
//! - `icon`: show the icon mapped to a weather condition code
//!
//! ## Example
//!
//! ```bash
//! # Run the demo with defaults (two taps, clear sky)
//! glance-cli demo
//!
//! # Run the demo from a config file, overriding the tap count
//! glance-cli demo --config demo.toml --taps 5
//!
//! # What does code 761 map to?
//! glance-cli icon 761
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::DemoConfig;

/// Demo and inspection CLI for glance-sync.
#[derive(Parser, Debug)]
#[command(name = "glance-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an in-process host/companion demo
    Demo {
        /// TOML configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of taps to simulate (overrides the config file)
        #[arg(long)]
        taps: Option<u32>,

        /// Leave the host store empty to exercise the resync path
        #[arg(long)]
        no_data: bool,
    },

    /// Show the icon mapped to a weather condition code
    Icon {
        /// Condition code (e.g. 800 for clear sky)
        code: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            config,
            taps,
            no_data,
        } => {
            let mut demo = match config {
                Some(path) => DemoConfig::load(&path).await?,
                None => DemoConfig::default(),
            };
            if let Some(taps) = taps {
                demo.taps = taps;
            }
            commands::demo(demo, no_data).await?;
        }
        Commands::Icon { code } => commands::icon(code),
    }

    Ok(())
}
