//! End-to-end ledger behavior against a real PostgreSQL database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p ledgerctl-server -- --ignored

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::CompanyType;
use ledgerctl_server::db::migrations;
use ledgerctl_server::db::{
    ChargeRepo, CompanyRepo, DashboardRepo, DocumentRepo, NewDocument, PackageRepo, PaymentRepo,
};
use ledgerctl_server::models::{
    ChargeDraft, ChargeEdit, CompanyDraft, CompanyFilter, PackageDraft, PackageUpdate, PaymentDraft,
};
use ledgerctl_server::{create_pool, DbError};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = create_pool(&url).await.unwrap();
    migrations::run(&pool).await.unwrap();
    pool
}

fn money(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn company(company_type: CompanyType, name: &str) -> CompanyDraft {
    CompanyDraft {
        company_type,
        name: name.to_owned(),
        address: None,
        ledger_link: None,
        director: None,
        contact: None,
        email: None,
    }
}

fn package(description: &str) -> PackageDraft {
    PackageDraft {
        date: day(1),
        description: description.to_owned(),
    }
}

fn charge(description: &str, amount: &str, d: u32) -> ChargeDraft {
    ChargeDraft {
        description: description.to_owned(),
        amount: money(amount),
        date: day(d),
    }
}

fn payment(amount: &str, d: u32) -> PaymentDraft {
    PaymentDraft {
        description: None,
        amount: money(amount),
        date: day(d),
    }
}

/// Unique suffix so tests sharing a database never see each other's rows
fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_owned()
}

#[tokio::test]
#[ignore = "requires database"]
async fn package_totals_and_company_net_due() {
    let pool = pool().await;
    let c = CompanyRepo::new(&pool)
        .create(&company(CompanyType::Client, &format!("Totals {}", tag())))
        .await
        .unwrap();

    let p1 = PackageRepo::new(&pool).create(c.id, &package("Spring order")).await.unwrap();
    let p2 = PackageRepo::new(&pool).create(c.id, &package("Summer order")).await.unwrap();

    let charges = ChargeRepo::new(&pool);
    charges.create(p1.id, &charge("Goods", "500", 1)).await.unwrap();
    charges.create(p1.id, &charge("Discount", "-50", 2)).await.unwrap();
    charges.create(p2.id, &charge("Freight", "100.25", 3)).await.unwrap();

    let payments = PaymentRepo::new(&pool);
    payments.create(p1.id, &payment("200", 4)).await.unwrap();
    payments.create(p2.id, &payment("400", 5)).await.unwrap();

    let summary = PackageRepo::new(&pool).summary(p1.id).await.unwrap();
    assert_eq!(summary.total, money("450"));
    assert_eq!(summary.paid, money("200"));
    assert_eq!(summary.balance, money("250"));

    let ledger = CompanyRepo::new(&pool).ledger(c.id).await.unwrap();
    assert_eq!(ledger.packages.len(), 2);
    assert_eq!(ledger.total_package_amount, money("550.25"));
    assert_eq!(ledger.total_payments_received, money("600"));
    // overpaid: net due goes negative
    assert_eq!(ledger.net_due, money("-49.75"));
    assert_eq!(ledger.payments.len(), 2);
    assert_eq!(ledger.payments[0].date, day(5));

    let rows = CompanyRepo::new(&pool)
        .list(&CompanyFilter {
            company_type: Some(CompanyType::Client),
            search: Some(c.name.clone()),
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].package_count, 2);
    assert_eq!(rows[0].total_charges, money("550.25"));
    assert_eq!(rows[0].total_payments, money("600"));
    assert_eq!(rows[0].amount_due, money("-49.75"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn company_with_packages_cannot_be_deleted() {
    let pool = pool().await;
    let companies = CompanyRepo::new(&pool);
    let c = companies
        .create(&company(CompanyType::Vendor, &format!("Guarded {}", tag())))
        .await
        .unwrap();
    let p = PackageRepo::new(&pool).create(c.id, &package("Keep me")).await.unwrap();

    let err = companies.delete(c.id).await.unwrap_err();
    match err {
        DbError::Conflict { message } => assert!(message.contains("existing packages (1)")),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert!(companies.get(c.id).await.is_ok());
    assert!(PackageRepo::new(&pool).get(p.id).await.is_ok());

    PackageRepo::new(&pool).delete(p.id).await.unwrap();
    companies.delete(c.id).await.unwrap();
    assert!(matches!(companies.get(c.id).await, Err(DbError::NotFound { .. })));
}

#[tokio::test]
#[ignore = "requires database"]
async fn package_with_entries_cannot_be_deleted() {
    let pool = pool().await;
    let c = CompanyRepo::new(&pool)
        .create(&company(CompanyType::Client, &format!("Entries {}", tag())))
        .await
        .unwrap();
    let packages = PackageRepo::new(&pool);

    let with_charge = packages.create(c.id, &package("Has charge")).await.unwrap();
    ChargeRepo::new(&pool)
        .create(with_charge.id, &charge("Goods", "10", 1))
        .await
        .unwrap();
    assert!(matches!(
        packages.delete(with_charge.id).await,
        Err(DbError::Conflict { .. })
    ));

    let with_payment = packages.create(c.id, &package("Has payment")).await.unwrap();
    PaymentRepo::new(&pool)
        .create(with_payment.id, &payment("10", 1))
        .await
        .unwrap();
    assert!(matches!(
        packages.delete(with_payment.id).await,
        Err(DbError::Conflict { .. })
    ));

    assert_eq!(packages.summary(with_charge.id).await.unwrap().charges.len(), 1);
    assert_eq!(packages.summary(with_payment.id).await.unwrap().payments.len(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn writes_propagate_and_reset_clears_updates() {
    let pool = pool().await;
    let companies = CompanyRepo::new(&pool);
    let c = companies
        .create(&company(CompanyType::Client, &format!("Flags {}", tag())))
        .await
        .unwrap();
    let p = PackageRepo::new(&pool).create(c.id, &package("Flagged")).await.unwrap();
    assert!(!companies.get(c.id).await.unwrap().has_updates);

    let ch = ChargeRepo::new(&pool).create(p.id, &charge("Goods", "75", 1)).await.unwrap();
    let pay = PaymentRepo::new(&pool).create(p.id, &payment("25", 2)).await.unwrap();
    assert!(ch.has_updates);
    assert!(companies.get(c.id).await.unwrap().has_updates);
    assert!(PackageRepo::new(&pool).get(p.id).await.unwrap().has_updates);

    companies.reset_updates(c.id).await.unwrap();

    let ledger = companies.ledger(c.id).await.unwrap();
    assert!(!ledger.company.has_updates);
    for summary in &ledger.packages {
        assert!(!summary.package.has_updates);
        assert!(summary.charges.iter().all(|c| !c.has_updates));
        assert!(summary.payments.iter().all(|p| !p.has_updates));
    }

    // deleting an entry is a write too
    PaymentRepo::new(&pool).delete(pay.id).await.unwrap();
    assert!(companies.get(c.id).await.unwrap().has_updates);
    assert!(PackageRepo::new(&pool).get(p.id).await.unwrap().has_updates);
}

#[tokio::test]
#[ignore = "requires database"]
async fn package_update_applies_charge_edits_atomically() {
    let pool = pool().await;
    let c = CompanyRepo::new(&pool)
        .create(&company(CompanyType::Vendor, &format!("Edits {}", tag())))
        .await
        .unwrap();
    let packages = PackageRepo::new(&pool);
    let p = packages.create(c.id, &package("Before")).await.unwrap();
    let existing = ChargeRepo::new(&pool).create(p.id, &charge("Goods", "100", 1)).await.unwrap();

    let update = PackageUpdate {
        package: PackageDraft {
            date: day(2),
            description: "After".into(),
        },
        charges: vec![
            ChargeEdit {
                id: Some(existing.id),
                charge: charge("Goods", "120", 1),
            },
            ChargeEdit {
                id: None,
                charge: charge("Rebate", "-20", 2),
            },
        ],
    };
    let updated = packages.update(p.id, &update).await.unwrap();
    assert_eq!(updated.description, "After");
    assert!(updated.has_updates);

    let summary = packages.summary(p.id).await.unwrap();
    assert_eq!(summary.charges.len(), 2);
    assert_eq!(summary.total, money("100"));

    // an unknown charge id rolls the whole update back
    let bad = PackageUpdate {
        package: PackageDraft {
            date: day(3),
            description: "Rolled back".into(),
        },
        charges: vec![ChargeEdit {
            id: Some(Uuid::new_v4()),
            charge: charge("Ghost", "1", 3),
        }],
    };
    assert!(matches!(packages.update(p.id, &bad).await, Err(DbError::NotFound { .. })));
    assert_eq!(packages.get(p.id).await.unwrap().description, "After");
}

#[tokio::test]
#[ignore = "requires database"]
async fn vendor_search_is_case_insensitive_and_newest_first() {
    let pool = pool().await;
    let companies = CompanyRepo::new(&pool);
    let t = tag();

    companies
        .create(&company(CompanyType::Vendor, &format!("ACME CO {}", t)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    companies
        .create(&company(CompanyType::Vendor, &format!("Delta {}", t)))
        .await
        .unwrap();
    companies
        .create(&company(CompanyType::Client, &format!("Cobalt {}", t)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let coast = companies
        .create(&company(CompanyType::Vendor, &format!("Coast {}", t)))
        .await
        .unwrap();

    let rows = companies
        .list(&CompanyFilter {
            company_type: Some(CompanyType::Vendor),
            search: Some("co".into()),
        })
        .await
        .unwrap();

    assert!(rows.iter().all(|r| r.company.company_type == CompanyType::Vendor));
    assert!(rows.iter().all(|r| r.company.name.to_lowercase().contains("co")));
    assert!(rows
        .windows(2)
        .all(|w| w[0].last_activity_timestamp >= w[1].last_activity_timestamp));

    let ours: Vec<&str> = rows
        .iter()
        .filter(|r| r.company.name.ends_with(&t))
        .map(|r| r.company.name.as_str())
        .collect();
    assert_eq!(ours, vec![coast.name.as_str(), &format!("ACME CO {}", t)]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn new_entries_move_an_older_company_to_the_top() {
    let pool = pool().await;
    let companies = CompanyRepo::new(&pool);
    let t = tag();
    let ours = |rows: &[ledgerctl_core::CompanySummary]| -> Vec<Uuid> {
        rows.iter()
            .filter(|r| r.company.name.ends_with(&t))
            .map(|r| r.company.id)
            .collect()
    };
    let filter = CompanyFilter {
        company_type: None,
        search: Some(t.clone()),
    };

    let older = companies
        .create(&company(CompanyType::Client, &format!("Older {}", t)))
        .await
        .unwrap();
    let older_pkg = PackageRepo::new(&pool).create(older.id, &package("Old work")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let newer = companies
        .create(&company(CompanyType::Client, &format!("Newer {}", t)))
        .await
        .unwrap();
    let newer_pkg = PackageRepo::new(&pool).create(newer.id, &package("New work")).await.unwrap();

    assert_eq!(ours(&companies.list(&filter).await.unwrap()), vec![newer.id, older.id]);

    // A charge under the older company's package puts it first
    tokio::time::sleep(Duration::from_millis(20)).await;
    let late_charge = ChargeRepo::new(&pool)
        .create(older_pkg.id, &charge("Late fee", "15", 2))
        .await
        .unwrap();
    let rows = companies.list(&filter).await.unwrap();
    assert_eq!(ours(&rows), vec![older.id, newer.id]);
    let top = rows.iter().find(|r| r.company.id == older.id).unwrap();
    assert!(top.last_activity_timestamp >= late_charge.created_at.timestamp_millis());

    // A payment does the same for the other one
    tokio::time::sleep(Duration::from_millis(20)).await;
    let late_payment = PaymentRepo::new(&pool)
        .create(newer_pkg.id, &payment("5", 3))
        .await
        .unwrap();
    let rows = companies.list(&filter).await.unwrap();
    assert_eq!(ours(&rows), vec![newer.id, older.id]);
    let top = rows.iter().find(|r| r.company.id == newer.id).unwrap();
    assert!(top.last_activity_timestamp >= late_payment.created_at.timestamp_millis());
}

#[tokio::test]
#[ignore = "requires database"]
async fn search_matches_wildcards_literally() {
    let pool = pool().await;
    let companies = CompanyRepo::new(&pool);
    let t = tag();
    let percent = companies
        .create(&company(CompanyType::Client, &format!("100% Cotton {}", t)))
        .await
        .unwrap();
    companies
        .create(&company(CompanyType::Client, &format!("1000 Cotton {}", t)))
        .await
        .unwrap();

    let rows = companies
        .list(&CompanyFilter {
            company_type: None,
            search: Some(format!("100% Cotton {}", t)),
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company.id, percent.id);
}

#[tokio::test]
#[ignore = "requires database"]
async fn documents_flag_the_package_and_cascade() {
    let pool = pool().await;
    let c = CompanyRepo::new(&pool)
        .create(&company(CompanyType::Client, &format!("Docs {}", tag())))
        .await
        .unwrap();
    let p = PackageRepo::new(&pool).create(c.id, &package("Scanned")).await.unwrap();
    let documents = DocumentRepo::new(&pool);

    let doc = documents
        .create(
            p.id,
            &NewDocument {
                name: "invoice.pdf".into(),
                url: format!("/uploads/packages/{}/1-invoice.pdf", p.id),
                mime_type: "application/pdf".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(doc.company_id, Some(c.id));
    assert!(CompanyRepo::new(&pool).get(c.id).await.unwrap().has_updates);

    let detail = PackageRepo::new(&pool).detail(p.id).await.unwrap();
    assert_eq!(detail.documents.len(), 1);
    assert_eq!(detail.company.id, c.id);

    let removed = PackageRepo::new(&pool).delete(p.id).await.unwrap();
    assert_eq!(removed.len(), 1);
    assert!(matches!(
        documents.list_for_package(p.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_parents_are_not_found() {
    let pool = pool().await;
    let ghost = Uuid::new_v4();

    assert!(matches!(
        PackageRepo::new(&pool).create(ghost, &package("Orphan")).await,
        Err(DbError::NotFound { resource: "company", .. })
    ));
    assert!(matches!(
        ChargeRepo::new(&pool).create(ghost, &charge("Orphan", "1", 1)).await,
        Err(DbError::NotFound { resource: "package", .. })
    ));
    assert!(matches!(
        PaymentRepo::new(&pool).create(ghost, &payment("1", 1)).await,
        Err(DbError::NotFound { resource: "package", .. })
    ));
    assert!(matches!(
        CompanyRepo::new(&pool).reset_updates(ghost).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn dashboard_counts_what_was_written() {
    let pool = pool().await;

    let c = CompanyRepo::new(&pool)
        .create(&company(CompanyType::Vendor, &format!("Dash {}", tag())))
        .await
        .unwrap();
    let p = PackageRepo::new(&pool).create(c.id, &package("Counted")).await.unwrap();
    ChargeRepo::new(&pool).create(p.id, &charge("Goods", "30", 1)).await.unwrap();

    let after = DashboardRepo::new(&pool).stats().await.unwrap();
    assert!(after.vendor_count >= 1);
    assert!(after.package_count >= 1);
    assert!(after.companies_with_updates >= 1);
    assert_eq!(after.outstanding, after.total_charges - after.total_payments);
}
