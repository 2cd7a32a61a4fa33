//! CLI entry-point for one-shot extraction without a server.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::io::AsyncReadExt;
use tracing::instrument;

use crate::{api::types::EntityResponse, config::Settings, extraction::ExtractionService, nlp};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Text to analyse; read from stdin when omitted.
    #[arg(long)]
    pub text: Option<String>,
    /// Keep only entities of this category.
    #[arg(long)]
    pub category: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading text from stdin")?;
            buf
        }
    };

    let service = ExtractionService::new(nlp::load_model(&settings)?);
    let entities = match args.category.as_deref() {
        Some(category) => service.category_specific_extract(category, &text)?,
        None => service.extract(&text)?,
    };
    let response = EntityResponse { text, entities };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
