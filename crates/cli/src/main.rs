mod cli;
mod client;
mod terminal;

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::client::{Outcome, Payload, UploadClient};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let server = match args.server {
        Some(url) => url,
        None => {
            auraverse_core::config::load_dotenv();
            auraverse_core::Config::from_env().client.api_url
        }
    };
    debug!("Using server {}", server);
    let client = UploadClient::new(&server);

    match args.command {
        Command::Submit {
            json,
            file,
            source_id,
        } => {
            let payload = match (json, file) {
                (Some(text), _) => Payload::Text(text),
                (None, Some(path)) => Payload::from_path(&path)?,
                (None, None) => bail!("provide --json or --file"),
            };

            terminal.print_info(&format!("Submitting to {}/upload ...", server.trim_end_matches('/')))?;
            match client.submit(payload, source_id.as_deref()).await {
                Ok(outcome) => {
                    terminal.print_outcome(&outcome)?;
                    if matches!(outcome, Outcome::Rejected { .. }) {
                        return Ok(ExitCode::FAILURE);
                    }
                }
                Err(e) => {
                    terminal.print_error(&format!("{:#}", e))?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Health => match client.health().await {
            Ok(body) => terminal.print_body(&body)?,
            Err(e) => {
                terminal.print_error(&format!("{:#}", e))?;
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
