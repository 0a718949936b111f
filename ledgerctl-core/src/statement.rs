//! Running-balance statements.
//!
//! A statement merges a package's charges (debits) and payments (credits)
//! into one date-ordered list and carries the balance forward line by line.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::PackageSummary;
use crate::model::{Charge, Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    // Declaration order is the same-day sort order.
    Charge,
    Payment,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Charge => "Charge",
            Self::Payment => "Payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub lines: Vec<StatementLine>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub closing_balance: Decimal,
}

impl Statement {
    /// Build a statement from raw entries.
    ///
    /// Ordered by date; on the same date charges come before payments, and
    /// entries of the same kind keep creation order.
    pub fn build(charges: &[Charge], payments: &[Payment]) -> Self {
        let mut entries: Vec<(NaiveDate, EntryKind, i64, String, Decimal)> =
            Vec::with_capacity(charges.len() + payments.len());

        for charge in charges {
            entries.push((
                charge.date,
                EntryKind::Charge,
                charge.created_at.timestamp_micros(),
                charge.description.clone(),
                charge.amount,
            ));
        }
        for payment in payments {
            entries.push((
                payment.date,
                EntryKind::Payment,
                payment.created_at.timestamp_micros(),
                payment.description.clone().unwrap_or_default(),
                payment.amount,
            ));
        }

        entries.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        let mut balance = Decimal::ZERO;
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;

        let lines = entries
            .into_iter()
            .map(|(date, kind, _, description, amount)| {
                let (debit, credit) = match kind {
                    EntryKind::Charge => {
                        balance += amount;
                        total_debits += amount;
                        (Some(amount), None)
                    }
                    EntryKind::Payment => {
                        balance -= amount;
                        total_credits += amount;
                        (None, Some(amount))
                    }
                };
                StatementLine {
                    date,
                    kind,
                    description,
                    debit,
                    credit,
                    balance,
                }
            })
            .collect();

        Self {
            lines,
            total_debits,
            total_credits,
            closing_balance: balance,
        }
    }

    pub fn for_package(summary: &PackageSummary) -> Self {
        Self::build(&summary.charges, &summary.payments)
    }
}
