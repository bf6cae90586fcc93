use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal upload client for the auraverse ingestion server.
///
/// Sends one document per invocation and prints the server's answer as-is.
#[derive(Parser, Debug)]
#[command(name = "auraverse", about = "Upload documents to the auraverse ingestion server")]
pub struct CliArgs {
    /// Server base URL (default: API_URL from the environment, then http://localhost:8000)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit pasted text or a file
    Submit {
        /// Inline JSON or text to submit
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        json: Option<String>,

        /// Path of a file to upload
        #[arg(long)]
        file: Option<PathBuf>,

        /// Source identifier recorded with the job
        #[arg(long)]
        source_id: Option<String>,
    },
    /// Check that the server is up
    Health,
}
