//! CLI for the fanout batched HTTP client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fanout_core::config;
use fanout_core::Client;

use commands::{run_get, run_send};

/// Top-level CLI for fanout.
#[derive(Debug, Parser)]
#[command(name = "fanout")]
#[command(about = "fanout: drive many HTTP transfers through one polling loop", long_about = None)]
pub struct Cli {
    /// Override the per-transfer timeout from config.toml.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every URL concurrently in one batch and print a line per completion.
    Get {
        /// HTTP/HTTPS URLs to fetch.
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Send one request, wait for it, and print the response body.
    Send {
        /// HTTP/HTTPS URL.
        url: String,

        /// Request method.
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra header as "Name: value" (repeatable).
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Request body.
        #[arg(short = 'd', long)]
        data: Option<String>,

        /// Print the status line and response headers before the body.
        #[arg(short = 'i', long)]
        include: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(secs) = cli.timeout {
            cfg.timeout_secs = secs;
        }
        tracing::debug!("loaded config: {:?}", cfg);
        let mut client = Client::from_config(&cfg);

        match cli.command {
            CliCommand::Get { urls } => run_get(&mut client, &urls)?,
            CliCommand::Send {
                url,
                method,
                headers,
                data,
                include,
            } => run_send(&mut client, &url, &method, &headers, data.as_deref(), include)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
