//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use ledgerctl_server::db::migrations;

use super::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let (_, pool) = super::open_database(&args.db).await?;

    migrations::run(&pool)
        .await
        .context("Failed to apply database schema")?;

    println!("Schema is up to date");
    Ok(())
}
