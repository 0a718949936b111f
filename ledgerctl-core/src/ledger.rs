//! In-process balance aggregation.
//!
//! The company list gets its totals from one SQL aggregate; the detail views
//! load raw rows and fold them here so every figure on a detail page comes
//! from the same charges and payments the page shows.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Charge, Company, Document, Package, Payment};

/// Anything carrying a money amount.
pub trait Amount {
    fn amount(&self) -> Decimal;
}

impl Amount for Charge {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Amount for Payment {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Sum the amounts of a slice of charges or payments.
pub fn sum_amounts<T: Amount>(items: &[T]) -> Decimal {
    items.iter().map(Amount::amount).sum()
}

/// A package with its entries and derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    #[serde(flatten)]
    pub package: Package,
    pub charges: Vec<Charge>,
    pub payments: Vec<Payment>,
    /// Sum of charge amounts, discounts included
    pub total: Decimal,
    /// Sum of payment amounts
    pub paid: Decimal,
    /// `total - paid`
    pub balance: Decimal,
}

impl PackageSummary {
    pub fn new(package: Package, charges: Vec<Charge>, payments: Vec<Payment>) -> Self {
        let total = sum_amounts(&charges);
        let paid = sum_amounts(&payments);
        Self {
            package,
            charges,
            payments,
            total,
            paid,
            balance: total - paid,
        }
    }

    /// Attach charges and payments to their packages.
    ///
    /// Package order is preserved. Entries whose package is not in
    /// `packages` are dropped.
    pub fn assemble(packages: Vec<Package>, charges: Vec<Charge>, payments: Vec<Payment>) -> Vec<Self> {
        let mut charges_by_package: HashMap<Uuid, Vec<Charge>> = HashMap::new();
        for charge in charges {
            charges_by_package.entry(charge.package_id).or_default().push(charge);
        }

        let mut payments_by_package: HashMap<Uuid, Vec<Payment>> = HashMap::new();
        for payment in payments {
            payments_by_package.entry(payment.package_id).or_default().push(payment);
        }

        packages
            .into_iter()
            .map(|package| {
                let charges = charges_by_package.remove(&package.id).unwrap_or_default();
                let payments = payments_by_package.remove(&package.id).unwrap_or_default();
                Self::new(package, charges, payments)
            })
            .collect()
    }
}

/// Company detail view: every package with totals, plus company figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyLedger {
    #[serde(flatten)]
    pub company: Company,
    pub packages: Vec<PackageSummary>,
    pub total_package_amount: Decimal,
    pub total_payments_received: Decimal,
    /// Negative when the company has overpaid
    pub net_due: Decimal,
    /// All packages' payments in one list, newest date first
    pub payments: Vec<Payment>,
}

impl CompanyLedger {
    pub fn new(company: Company, packages: Vec<PackageSummary>) -> Self {
        let total_package_amount: Decimal = packages.iter().map(|p| p.total).sum();
        let total_payments_received: Decimal = packages.iter().map(|p| p.paid).sum();

        let mut payments: Vec<Payment> = packages
            .iter()
            .flat_map(|p| p.payments.iter().cloned())
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        Self {
            company,
            packages,
            total_package_amount,
            total_payments_received,
            net_due: total_package_amount - total_payments_received,
            payments,
        }
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

/// Package detail view: the package summary, its owner and its documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetail {
    #[serde(flatten)]
    pub summary: PackageSummary,
    pub company: Company,
    pub documents: Vec<Document>,
}
