//! HTTP server command
//!
//! Runs migrations, then serves the ledger API until Ctrl+C/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ledgerctl_core::LedgerConfig;
use ledgerctl_server::db::migrations;
use ledgerctl_server::{run_server, ServerConfig};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "LEDGERCTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Directory for uploaded documents
    #[arg(long, env = "LEDGERCTL_UPLOADS_DIR")]
    pub uploads_dir: Option<PathBuf>,

    /// Skip applying the schema on startup
    #[arg(long)]
    pub no_migrate: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

impl ServeArgs {
    /// Layer command-line flags over the loaded config.
    fn server_config(&self, config: &LedgerConfig) -> ServerConfig {
        let mut server = ServerConfig::from(config);
        if let Some(bind) = self.bind {
            server.bind_addr = bind;
        }
        if self.cors_permissive {
            server.cors_permissive = true;
        }
        if let Some(dir) = &self.uploads_dir {
            server.uploads_dir = dir.clone();
        }
        server
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let (config, pool) = super::open_database(&args.db).await?;
    let server = args.server_config(&config);

    if args.no_migrate {
        tracing::info!("Skipping migrations (--no-migrate)");
    } else {
        migrations::run(&pool)
            .await
            .context("Failed to apply database schema")?;
    }

    tracing::info!("Starting ledgerctl server on {}", server.bind_addr);

    // Blocks until shutdown
    run_server(pool, server).await.context("Server error")?;

    Ok(())
}
