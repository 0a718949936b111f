use chrono::{DateTime, NaiveDate};
use ledgerctl_core::{Charge, Company, CompanyLedger, CompanyType, Package, PackageSummary, Payment, Statement};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn company() -> Company {
    Company {
        id: Uuid::new_v4(),
        company_type: CompanyType::Vendor,
        name: "Prop Co".into(),
        address: None,
        ledger_link: None,
        director: None,
        contact: None,
        email: None,
        has_updates: false,
        created_at: DateTime::from_timestamp(0, 0).unwrap(),
        updated_at: DateTime::from_timestamp(0, 0).unwrap(),
    }
}

fn package(company_id: Uuid) -> Package {
    Package {
        id: Uuid::new_v4(),
        company_id,
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        description: "generated".into(),
        has_updates: false,
        created_at: DateTime::from_timestamp(0, 0).unwrap(),
        updated_at: DateTime::from_timestamp(0, 0).unwrap(),
    }
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn charge(package_id: Uuid, amount: i64, day: u32) -> Charge {
    Charge {
        id: Uuid::new_v4(),
        package_id,
        description: "c".into(),
        amount: cents(amount),
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        has_updates: false,
        created_at: DateTime::from_timestamp(i64::from(day), 0).unwrap(),
        updated_at: DateTime::from_timestamp(i64::from(day), 0).unwrap(),
    }
}

fn payment(package_id: Uuid, amount: i64, day: u32) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        package_id,
        description: None,
        amount: cents(amount),
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        has_updates: false,
        created_at: DateTime::from_timestamp(i64::from(day), 0).unwrap(),
        updated_at: DateTime::from_timestamp(i64::from(day), 0).unwrap(),
    }
}

// (charges, payments) per package: charge amounts may be negative (discounts)
fn arb_packages() -> impl Strategy<Value = Vec<(Vec<(i64, u32)>, Vec<(i64, u32)>)>> {
    prop::collection::vec(
        (
            prop::collection::vec((-50_000i64..500_000, 1u32..28), 0..8),
            prop::collection::vec((1i64..500_000, 1u32..28), 0..8),
        ),
        0..6,
    )
}

proptest! {
    /// Property: company total equals the sum of every charge in every package
    #[test]
    fn prop_company_total_is_sum_of_charges(shape in arb_packages()) {
        let company = company();
        let mut all_charges = Decimal::ZERO;
        let mut all_payments = Decimal::ZERO;

        let summaries: Vec<PackageSummary> = shape
            .iter()
            .map(|(charges, payments)| {
                let pkg = package(company.id);
                let charges: Vec<Charge> = charges.iter().map(|&(a, d)| charge(pkg.id, a, d)).collect();
                let payments: Vec<Payment> = payments.iter().map(|&(a, d)| payment(pkg.id, a, d)).collect();
                all_charges += charges.iter().map(|c| c.amount).sum::<Decimal>();
                all_payments += payments.iter().map(|p| p.amount).sum::<Decimal>();
                PackageSummary::new(pkg, charges, payments)
            })
            .collect();

        let payment_count: usize = summaries.iter().map(|s| s.payments.len()).sum();
        let ledger = CompanyLedger::new(company, summaries);

        prop_assert_eq!(ledger.total_package_amount, all_charges);
        prop_assert_eq!(ledger.total_payments_received, all_payments);
        prop_assert_eq!(ledger.net_due, all_charges - all_payments);
        prop_assert_eq!(ledger.payments.len(), payment_count);
    }

    /// Property: a statement's closing balance equals the package balance
    #[test]
    fn prop_statement_closes_at_package_balance(
        charges in prop::collection::vec((-50_000i64..500_000, 1u32..28), 0..12),
        payments in prop::collection::vec((1i64..500_000, 1u32..28), 0..12),
    ) {
        let pkg = package(Uuid::new_v4());
        let charges: Vec<Charge> = charges.iter().map(|&(a, d)| charge(pkg.id, a, d)).collect();
        let payments: Vec<Payment> = payments.iter().map(|&(a, d)| payment(pkg.id, a, d)).collect();
        let summary = PackageSummary::new(pkg, charges, payments);

        let statement = Statement::for_package(&summary);

        prop_assert_eq!(statement.closing_balance, summary.balance);
        prop_assert_eq!(statement.lines.len(), summary.charges.len() + summary.payments.len());
        // dates never go backwards
        for pair in statement.lines.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }
}
