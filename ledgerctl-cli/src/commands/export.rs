//! CSV export commands
//!
//! `companies` mirrors the API list view, `statement` is one package's
//! running balance, `report` is every package of a company followed by the
//! company totals. Output goes to `--out` or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use ledgerctl_core::{CompanyLedger, CompanySummary, CompanyType, PackageSummary, Statement};
use ledgerctl_server::db::{CompanyRepo, PackageRepo};
use ledgerctl_server::models::CompanyFilter;

use super::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommands,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o', global = true)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Company list with totals, newest activity first
    Companies(CompaniesArgs),
    /// Running-balance statement for one package
    Statement {
        /// Package ID
        package_id: Uuid,
    },
    /// Every package of a company plus company totals
    Report {
        /// Company ID
        company_id: Uuid,
    },
}

#[derive(Parser, Debug)]
pub struct CompaniesArgs {
    /// Only CLIENT or VENDOR companies
    #[arg(long = "type", value_parser = parse_company_type)]
    pub company_type: Option<CompanyType>,

    /// Case-insensitive substring of the company name
    #[arg(long)]
    pub search: Option<String>,
}

fn parse_company_type(s: &str) -> Result<CompanyType, String> {
    s.parse().map_err(|e: ledgerctl_core::LedgerError| e.to_string())
}

pub async fn run_export(args: ExportArgs) -> Result<()> {
    let (_, pool) = super::open_database(&args.db).await?;
    let out = open_output(args.out.as_ref())?;

    match args.command {
        ExportCommands::Companies(filter_args) => {
            let filter = CompanyFilter {
                company_type: filter_args.company_type,
                search: filter_args.search.filter(|s| !s.trim().is_empty()),
            };
            let rows = CompanyRepo::new(&pool)
                .list(&filter)
                .await
                .context("Failed to load companies")?;
            tracing::info!(count = rows.len(), "exporting companies");
            write_companies(out, &rows)?;
        }
        ExportCommands::Statement { package_id } => {
            let summary = PackageRepo::new(&pool)
                .summary(package_id)
                .await
                .with_context(|| format!("Failed to load package {}", package_id))?;
            write_statement(out, &summary)?;
        }
        ExportCommands::Report { company_id } => {
            let ledger = CompanyRepo::new(&pool)
                .ledger(company_id)
                .await
                .with_context(|| format!("Failed to load company {}", company_id))?;
            tracing::info!(packages = ledger.package_count(), "exporting company report");
            write_report(out, &ledger)?;
        }
    }

    if let Some(path) = &args.out {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn optional_amount(value: Option<Decimal>) -> String {
    value.map(amount).unwrap_or_default()
}

const STATEMENT_HEADER: [&str; 6] = ["Date", "Type", "Description", "Debit", "Credit", "Balance"];

/// Company list rows.
pub fn write_companies<W: Write>(out: W, rows: &[CompanySummary]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(out);
    csv.write_record([
        "Name",
        "Type",
        "Packages",
        "Total Charges",
        "Total Payments",
        "Amount Due",
        "Last Activity",
        "Has Updates",
        "Contact",
        "Email",
    ])?;

    for row in rows {
        let last_activity = row
            .last_activity()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        csv.write_record([
            row.company.name.clone(),
            row.company.company_type.to_string(),
            row.package_count.to_string(),
            amount(row.total_charges),
            amount(row.total_payments),
            amount(row.amount_due),
            last_activity,
            if row.company.has_updates { "yes" } else { "no" }.to_owned(),
            row.company.contact.clone().unwrap_or_default(),
            row.company.email.clone().unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// One package's statement with a closing totals row.
pub fn write_statement<W: Write>(out: W, summary: &PackageSummary) -> Result<()> {
    let mut csv = csv::Writer::from_writer(out);
    csv.write_record(STATEMENT_HEADER)?;
    write_statement_rows(&mut csv, &Statement::for_package(summary))?;
    csv.flush()?;
    Ok(())
}

/// Company report: a section per package, then company totals.
pub fn write_report<W: Write>(out: W, ledger: &CompanyLedger) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(out);

    csv.write_record(["Company", ledger.company.name.as_str()])?;
    csv.write_record(["Type", ledger.company.company_type.as_str()])?;

    for summary in &ledger.packages {
        csv.write_record([
            "Package".to_owned(),
            summary.package.date.to_string(),
            summary.package.description.clone(),
        ])?;
        csv.write_record(STATEMENT_HEADER)?;
        write_statement_rows(&mut csv, &Statement::for_package(summary))?;
    }

    let totals = [
        ("Total package amount", ledger.total_package_amount),
        ("Total payments received", ledger.total_payments_received),
        ("Net due", ledger.net_due),
    ];
    for (label, value) in totals {
        csv.write_record([label.to_owned(), amount(value)])?;
    }

    csv.flush()?;
    Ok(())
}

fn write_statement_rows<W: Write>(csv: &mut csv::Writer<W>, statement: &Statement) -> Result<()> {
    for line in &statement.lines {
        csv.write_record([
            line.date.to_string(),
            line.kind.label().to_owned(),
            line.description.clone(),
            optional_amount(line.debit),
            optional_amount(line.credit),
            amount(line.balance),
        ])?;
    }
    csv.write_record([
        String::new(),
        String::new(),
        "Total".to_owned(),
        amount(statement.total_debits),
        amount(statement.total_credits),
        amount(statement.closing_balance),
    ])?;
    Ok(())
}
