//! Company repository
//!
//! - list: one aggregate query with per-package sums pre-grouped in CTEs
//! - ledger: three flat queries folded in `CompanyLedger`
//! - delete: refused while the company owns packages
//! - reset_updates: clears the flag top-down in one transaction

use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::{Charge, Company, CompanyLedger, CompanySummary, Package, PackageSummary, Payment};

use super::{DbError, CHARGE_COLUMNS, COMPANY_COLUMNS, PACKAGE_COLUMNS, PAYMENT_COLUMNS};
use crate::models::{CompanyDraft, CompanyFilter};

/// Company repository
pub struct CompanyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List companies with package count, totals and last activity.
    ///
    /// Charges and payments are summed per package before joining so a
    /// package with several of each does not multiply rows. GREATEST skips
    /// NULLs, so companies without packages fall back to `updated_at`.
    /// Always ordered by last activity, newest first.
    pub async fn list(&self, filter: &CompanyFilter) -> Result<Vec<CompanySummary>, DbError> {
        let rows: Vec<CompanySummary> = sqlx::query_as(
            r#"
            WITH charge_totals AS (
                SELECT package_id, SUM(amount) AS total, MAX(created_at) AS last_created
                FROM charges
                GROUP BY package_id
            ),
            payment_totals AS (
                SELECT package_id, SUM(amount) AS total, MAX(created_at) AS last_created
                FROM payments
                GROUP BY package_id
            )
            SELECT
                c.id,
                c.company_type,
                c.name,
                c.address,
                c.ledger_link,
                c.director,
                c.contact,
                c.email,
                c.has_updates,
                c.created_at,
                c.updated_at,
                COUNT(p.id) AS package_count,
                COALESCE(SUM(ct.total), 0) AS total_charges,
                COALESCE(SUM(pt.total), 0) AS total_payments,
                COALESCE(SUM(ct.total), 0) - COALESCE(SUM(pt.total), 0) AS amount_due,
                FLOOR(EXTRACT(EPOCH FROM GREATEST(
                    c.updated_at,
                    MAX(p.created_at),
                    MAX(ct.last_created),
                    MAX(pt.last_created)
                )) * 1000)::BIGINT AS last_activity_timestamp
            FROM companies c
            LEFT JOIN packages p ON p.company_id = c.id
            LEFT JOIN charge_totals ct ON ct.package_id = p.id
            LEFT JOIN payment_totals pt ON pt.package_id = p.id
            WHERE ($1::TEXT IS NULL OR c.company_type = $1)
              AND ($2::TEXT IS NULL OR c.name ILIKE $2)
            GROUP BY c.id
            ORDER BY last_activity_timestamp DESC, c.name ASC
            "#,
        )
        .bind(filter.company_type.map(|t| t.as_str()))
        .bind(filter.name_pattern())
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(count = rows.len(), ?filter, "listed companies");
        Ok(rows)
    }

    /// Get a single company by ID.
    pub async fn get(&self, id: Uuid) -> Result<Company, DbError> {
        let sql = format!("SELECT {} FROM companies WHERE id = $1", COMPANY_COLUMNS);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("company", id))
    }

    /// Company with every package, charge and payment, totals computed.
    pub async fn ledger(&self, id: Uuid) -> Result<CompanyLedger, DbError> {
        let company = self.get(id).await?;

        let sql = format!(
            "SELECT {} FROM packages WHERE company_id = $1 ORDER BY date DESC, created_at DESC",
            PACKAGE_COLUMNS
        );
        let packages: Vec<Package> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        let sql = format!(
            "SELECT {} FROM charges \
             WHERE package_id IN (SELECT id FROM packages WHERE company_id = $1) \
             ORDER BY date, created_at",
            CHARGE_COLUMNS
        );
        let charges: Vec<Charge> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        let sql = format!(
            "SELECT {} FROM payments \
             WHERE package_id IN (SELECT id FROM packages WHERE company_id = $1) \
             ORDER BY date, created_at",
            PAYMENT_COLUMNS
        );
        let payments: Vec<Payment> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        let packages = PackageSummary::assemble(packages, charges, payments);
        Ok(CompanyLedger::new(company, packages))
    }

    /// Insert a company.
    pub async fn create(&self, draft: &CompanyDraft) -> Result<Company, DbError> {
        let sql = format!(
            r#"
            INSERT INTO companies (company_type, name, address, ledger_link, director, contact, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        let company: Company = sqlx::query_as(&sql)
            .bind(draft.company_type.as_str())
            .bind(&draft.name)
            .bind(&draft.address)
            .bind(&draft.ledger_link)
            .bind(&draft.director)
            .bind(&draft.contact)
            .bind(&draft.email)
            .fetch_one(self.pool)
            .await?;

        tracing::info!(id = %company.id, name = %company.name, "created company");
        Ok(company)
    }

    /// Replace a company's fields.
    pub async fn update(&self, id: Uuid, draft: &CompanyDraft) -> Result<Company, DbError> {
        let sql = format!(
            r#"
            UPDATE companies
            SET company_type = $2,
                name = $3,
                address = $4,
                ledger_link = $5,
                director = $6,
                contact = $7,
                email = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(draft.company_type.as_str())
            .bind(&draft.name)
            .bind(&draft.address)
            .bind(&draft.ledger_link)
            .bind(&draft.director)
            .bind(&draft.contact)
            .bind(&draft.email)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("company", id))
    }

    /// Delete a company that owns no packages.
    ///
    /// The company row is locked first; inserting a package takes a key
    /// share lock on it, so no package can slip in between count and delete.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("company", id));
        }

        let (package_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM packages WHERE company_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if package_count > 0 {
            return Err(DbError::Conflict {
                message: format!(
                    "Cannot delete company with existing packages ({}). Delete its packages first.",
                    package_count
                ),
            });
        }

        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%id, "deleted company");
        Ok(())
    }

    /// Clear `has_updates` on the company, its packages, and their charges
    /// and payments.
    ///
    /// Reading is not activity: `updated_at` is left alone so the company
    /// keeps its place in the list.
    pub async fn reset_updates(&self, id: Uuid) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE companies SET has_updates = FALSE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("company", id));
        }

        let package_ids: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE packages SET has_updates = FALSE WHERE company_id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        if !package_ids.is_empty() {
            sqlx::query("UPDATE charges SET has_updates = FALSE WHERE package_id = ANY($1)")
                .bind(&package_ids)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE payments SET has_updates = FALSE WHERE package_id = ANY($1)")
                .bind(&package_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(%id, packages = package_ids.len(), "cleared updates");
        Ok(())
    }
}
