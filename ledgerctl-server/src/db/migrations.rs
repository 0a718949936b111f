//! Schema migrations for the ledger tables
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so `run` is safe on each
//! server start. Foreign keys from packages/charges/payments are RESTRICT;
//! the delete guards in the repositories report the conflict before the
//! database would.

use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        company_type TEXT NOT NULL CHECK (company_type IN ('CLIENT', 'VENDOR')),
        name TEXT NOT NULL,
        address TEXT,
        ledger_link TEXT,
        director TEXT,
        contact TEXT,
        email TEXT,
        has_updates BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS packages (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        company_id UUID NOT NULL REFERENCES companies(id) ON DELETE RESTRICT,
        date DATE NOT NULL,
        description TEXT NOT NULL,
        has_updates BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS charges (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        package_id UUID NOT NULL REFERENCES packages(id) ON DELETE RESTRICT,
        description TEXT NOT NULL,
        amount NUMERIC(14, 2) NOT NULL,
        date DATE NOT NULL,
        has_updates BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        package_id UUID NOT NULL REFERENCES packages(id) ON DELETE RESTRICT,
        description TEXT,
        amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
        date DATE NOT NULL,
        has_updates BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        company_id UUID REFERENCES companies(id) ON DELETE CASCADE,
        package_id UUID REFERENCES packages(id) ON DELETE CASCADE,
        url TEXT NOT NULL,
        name TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_packages_company ON packages(company_id)",
    "CREATE INDEX IF NOT EXISTS idx_charges_package ON charges(package_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_package ON payments(package_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_package ON documents(package_id)",
    "CREATE INDEX IF NOT EXISTS idx_companies_name_lower ON companies(LOWER(name))",
];

/// Run all ledger migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running ledger migrations...");

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(statements = SCHEMA.len(), "Ledger migrations complete");
    Ok(())
}
