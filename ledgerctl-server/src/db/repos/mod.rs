//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; one repository per table
//! - Aggregates in SQL for list views (no N+1)
//! - Uses a transaction whenever a write also propagates `has_updates`

pub mod charges;
pub mod companies;
pub mod dashboard;
pub mod documents;
pub mod packages;
pub mod payments;
mod updates;

pub use charges::ChargeRepo;
pub use companies::CompanyRepo;
pub use dashboard::DashboardRepo;
pub use documents::{DocumentRepo, NewDocument};
pub use packages::PackageRepo;
pub use payments::PaymentRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Write refused because dependent rows exist
    #[error("{message}")]
    Conflict { message: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

pub(crate) const COMPANY_COLUMNS: &str = "id, company_type, name, address, ledger_link, director, \
     contact, email, has_updates, created_at, updated_at";

pub(crate) const PACKAGE_COLUMNS: &str =
    "id, company_id, date, description, has_updates, created_at, updated_at";

pub(crate) const CHARGE_COLUMNS: &str =
    "id, package_id, description, amount, date, has_updates, created_at, updated_at";

pub(crate) const PAYMENT_COLUMNS: &str =
    "id, package_id, description, amount, date, has_updates, created_at, updated_at";

pub(crate) const DOCUMENT_COLUMNS: &str =
    "id, company_id, package_id, url, name, mime_type, created_at";
