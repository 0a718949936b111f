//! Ledger records as stored in the database.
//!
//! These are plain data carriers. Derived values (totals, balances, last
//! activity) live in [`crate::ledger`] and the read models at the bottom of
//! this file; none of them are persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

/// Whether a company is billed (client) or bills us (vendor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum CompanyType {
    Client,
    Vendor,
}

impl CompanyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Vendor => "VENDOR",
        }
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyType {
    type Err = LedgerError;

    /// Case-insensitive: `client`, `Client` and `CLIENT` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Self::Client),
            "VENDOR" => Ok(Self::Vendor),
            _ => Err(LedgerError::invalid_company_type(s)),
        }
    }
}

/// A client or vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub name: String,
    pub address: Option<String>,
    pub ledger_link: Option<String>,
    pub director: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub has_updates: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A billable unit of work under a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub has_updates: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A debit against a package. Negative amounts are discounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: Uuid,
    pub package_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub has_updates: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Money received against a package. Amount is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub package_id: Uuid,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub has_updates: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An uploaded file attached to a package and/or company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub url: String,
    pub name: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the company list: the company plus its aggregate figures.
///
/// `last_activity_timestamp` is epoch milliseconds of the latest of
/// company update, package creation, charge creation and payment creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub company: Company,
    pub package_count: i64,
    pub total_charges: Decimal,
    pub total_payments: Decimal,
    pub amount_due: Decimal,
    pub last_activity_timestamp: i64,
}

impl CompanySummary {
    /// Last activity as a UTC timestamp, if the millisecond value is in range.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_activity_timestamp)
    }
}

/// Ledger-wide figures for the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub client_count: i64,
    pub vendor_count: i64,
    pub package_count: i64,
    pub total_charges: Decimal,
    pub total_payments: Decimal,
    pub outstanding: Decimal,
    pub companies_with_updates: i64,
}
