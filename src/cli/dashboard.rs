//! CLI entry-point for the dashboard.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, ui};

/// Args for the `dashboard` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Port to bind (default 8501).
    #[arg(long, default_value_t = 8501)]
    pub port: u16,
    /// Host address, defaults to localhost.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Extraction API base URL; overrides SERVICE_URL.
    #[arg(long)]
    pub service_url: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let service_url = args.service_url.unwrap_or(settings.service_url);
    ui::serve(service_url, args.host, args.port).await
}
