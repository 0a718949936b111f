//! ledgerctl CLI - small business ledger for clients and vendors
//!
//! Entry point for the `ledgerctl` binary:
//! - HTTP API server over the PostgreSQL ledger (`serve`)
//! - Schema migrations (`migrate`)
//! - Configuration file management (`config`)
//! - CSV exports: company list, package statement, company report (`export`)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerctl",
    author,
    version,
    about = "Track charges, payments and balances for client and vendor companies",
    long_about = "Serve a JSON API over a PostgreSQL ledger of companies, packages, \
                  charges, payments and documents, and export statements as CSV."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply the database schema (idempotent)
    Migrate(commands::migrate::MigrateArgs),
    /// Manage ledgerctl configuration (show, init, path)
    Config(config::ConfigArgs),
    /// Export ledger data as CSV
    Export(commands::export::ExportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing: clap falls back to env vars that may live in .env
    let dotenv = ledgerctl_core::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    dotenv.log();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Config(args) => config::run_config(args)?,
        Commands::Export(args) => commands::run_export(args).await?,
    }
    Ok(())
}
