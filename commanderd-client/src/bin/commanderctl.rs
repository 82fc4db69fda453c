//! Command-line client for a running commanderd.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commanderd_client::{CommanderClient, DEFAULT_SOCK};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "commanderctl", version)]
#[command(about = "Inspect and drive a running commanderd")]
struct Cli {
    /// Daemon socket path
    #[arg(long, default_value = DEFAULT_SOCK)]
    socket: PathBuf,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List the registered commands
    Listing,
    /// Show daemon uptime and execution counters
    Status,
    /// Dispatch a command with a JSON parameters payload
    Run {
        command: String,
        #[arg(default_value = "{}")]
        parameters: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = CommanderClient::new(&cli.socket);

    match cli.action {
        Action::Listing => print_json(&client.listing().await?),
        Action::Status => print_json(&client.status().await?),
        Action::Run {
            command,
            parameters,
        } => {
            let parameters: Value =
                serde_json::from_str(&parameters).context("parameters must be valid JSON")?;
            let reply = client.dispatch(&command, parameters).await?;
            print_json(&reply.body);
            if !reply.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(_) => println!("{value}"),
    }
}
