//! Command implementations for the ledgerctl CLI

pub mod export;
pub mod migrate;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;

use ledgerctl_core::LedgerConfig;
use ledgerctl_server::db::{create_pool_with_options, PgPool};

pub use export::run_export;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Database flag shared by every command that talks to PostgreSQL
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Database URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    /// Flag (or DATABASE_URL via clap) first, then the config file.
    pub fn resolve<'a>(&'a self, config: &'a LedgerConfig) -> Result<&'a str> {
        match self.database_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Ok(config.database_url()?),
        }
    }

    pub async fn connect(&self, config: &LedgerConfig) -> Result<PgPool> {
        let url = self.resolve(config)?;
        create_pool_with_options(url, config.database.max_connections)
            .await
            .context("Failed to create database pool")
    }
}

/// Load the config file and open a pool.
pub(crate) async fn open_database(args: &DatabaseArgs) -> Result<(LedgerConfig, PgPool)> {
    let config = LedgerConfig::load().context("Failed to load config")?;
    let pool = args.connect(&config).await?;
    Ok((config, pool))
}
