//! Command-line interface wiring for health-ner.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

#[cfg(feature = "dashboard")]
pub mod dashboard;
pub mod extract;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Health entity extraction service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::run(args, settings).await,
            #[cfg(feature = "dashboard")]
            Commands::Dashboard(args) => dashboard::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the entity extraction API.
    Serve(serve::Args),
    /// Serve the interactive dashboard in front of a running API.
    #[cfg(feature = "dashboard")]
    Dashboard(dashboard::Args),
    /// Run the model once over text and print the entities as JSON.
    Extract(extract::Args),
}
