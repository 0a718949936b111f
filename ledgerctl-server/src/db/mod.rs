//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool (default 5 connections)
//! - List views aggregate in SQL; detail views load rows with one query per
//!   table and fold them in `ledgerctl_core::ledger` (no N+1)
//! - Transactions for every mutation that also propagates `has_updates`

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use sqlx::PgPool;
pub use repos::*;
