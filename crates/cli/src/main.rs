//! E-Store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! estore-cli migrate
//!
//! # Seed the database with demo data
//! estore-cli seed
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "estore-cli")]
#[command(author, version, about = "E-Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with a demo customer, products, and card
    Seed,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
