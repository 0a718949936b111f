//! ledgerctl-core: ledger records, balance aggregation and configuration.
//!
//! Shared by the HTTP server and the `ledgerctl` binary. Nothing in here
//! talks to the database; enable the `sqlx` feature to get row mappings.

pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod statement;

pub use config::{load_dotenv, DotenvReport, LedgerConfig};
pub use error::{LedgerError, Result};
pub use ledger::{sum_amounts, CompanyLedger, PackageDetail, PackageSummary};
pub use model::{Charge, Company, CompanySummary, CompanyType, DashboardStats, Document, Package, Payment};
pub use statement::{EntryKind, Statement, StatementLine};
