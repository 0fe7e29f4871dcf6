use anyhow::Result;
use clap::Parser;

use aurora_alert::bootstrap::{init_tracing_subscriber, resolve_config, wire};
use aurora_alert::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load .env: {err}");
        }
    }

    if let Err(err) = init_tracing_subscriber() {
        eprintln!("Failed to initialize tracing: {err}");
    }

    let config = resolve_config(args.config.clone())?;
    let runtime = wire(&config)?;

    cli::run(args.command, &runtime).await
}
