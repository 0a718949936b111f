//! Package repository
//!
//! - create: checks the owning company inside the insert transaction
//! - update: package fields plus optional charge edits, atomically
//! - delete: refused while any charge or payment exists

use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::{Charge, Company, Document, Package, PackageDetail, PackageSummary, Payment};

use super::updates::mark_package_updated;
use super::{DbError, CHARGE_COLUMNS, COMPANY_COLUMNS, DOCUMENT_COLUMNS, PACKAGE_COLUMNS, PAYMENT_COLUMNS};
use crate::models::{PackageDraft, PackageUpdate};

/// Package repository
pub struct PackageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PackageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a package under an existing company.
    pub async fn create(&self, company_id: Uuid, draft: &PackageDraft) -> Result<Package, DbError> {
        let mut tx = self.pool.begin().await?;

        let company_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)")
                .bind(company_id)
                .fetch_one(&mut *tx)
                .await?;
        if !company_exists.0 {
            return Err(DbError::not_found("company", company_id));
        }

        let sql = format!(
            "INSERT INTO packages (company_id, date, description) VALUES ($1, $2, $3) RETURNING {}",
            PACKAGE_COLUMNS
        );
        let package: Package = sqlx::query_as(&sql)
            .bind(company_id)
            .bind(draft.date)
            .bind(&draft.description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(id = %package.id, %company_id, "created package");
        Ok(package)
    }

    /// Get a single package by ID.
    pub async fn get(&self, id: Uuid) -> Result<Package, DbError> {
        let sql = format!("SELECT {} FROM packages WHERE id = $1", PACKAGE_COLUMNS);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("package", id))
    }

    /// Package with charges, payments and totals.
    pub async fn summary(&self, id: Uuid) -> Result<PackageSummary, DbError> {
        let package = self.get(id).await?;

        let sql = format!(
            "SELECT {} FROM charges WHERE package_id = $1 ORDER BY date, created_at",
            CHARGE_COLUMNS
        );
        let charges: Vec<Charge> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        let sql = format!(
            "SELECT {} FROM payments WHERE package_id = $1 ORDER BY date, created_at",
            PAYMENT_COLUMNS
        );
        let payments: Vec<Payment> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        Ok(PackageSummary::new(package, charges, payments))
    }

    /// Package summary plus owning company and documents.
    pub async fn detail(&self, id: Uuid) -> Result<PackageDetail, DbError> {
        let summary = self.summary(id).await?;

        let sql = format!("SELECT {} FROM companies WHERE id = $1", COMPANY_COLUMNS);
        let company: Company = sqlx::query_as(&sql)
            .bind(summary.package.company_id)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM documents WHERE package_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        );
        let documents: Vec<Document> = sqlx::query_as(&sql).bind(id).fetch_all(self.pool).await?;

        Ok(PackageDetail {
            summary,
            company,
            documents,
        })
    }

    /// Update package fields and apply charge edits in one transaction.
    ///
    /// Charge edits flag the package and company; a plain field edit does not.
    pub async fn update(&self, id: Uuid, update: &PackageUpdate) -> Result<Package, DbError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE packages
            SET date = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        );
        let mut package: Package = sqlx::query_as(&sql)
            .bind(id)
            .bind(update.package.date)
            .bind(&update.package.description)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("package", id))?;

        for edit in &update.charges {
            let charge = &edit.charge;
            match edit.id {
                Some(charge_id) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE charges
                        SET description = $3, amount = $4, date = $5,
                            has_updates = TRUE, updated_at = NOW()
                        WHERE id = $1 AND package_id = $2
                        "#,
                    )
                    .bind(charge_id)
                    .bind(id)
                    .bind(&charge.description)
                    .bind(charge.amount)
                    .bind(charge.date)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(DbError::not_found("charge", charge_id));
                    }
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO charges (package_id, description, amount, date, has_updates)
                        VALUES ($1, $2, $3, $4, TRUE)
                        "#,
                    )
                    .bind(id)
                    .bind(&charge.description)
                    .bind(charge.amount)
                    .bind(charge.date)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        if !update.charges.is_empty() {
            mark_package_updated(&mut *tx, id).await?;
            package.has_updates = true;
        }

        tx.commit().await?;
        tracing::info!(%id, charge_edits = update.charges.len(), "updated package");
        Ok(package)
    }

    /// Delete a package with no charges and no payments.
    ///
    /// Returns the package's documents, whose rows cascade with it, so the
    /// caller can remove the stored files.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<Document>, DbError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM packages WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("package", id));
        }

        let (charge_count, payment_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM charges WHERE package_id = $1),
                (SELECT COUNT(*) FROM payments WHERE package_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if charge_count > 0 || payment_count > 0 {
            return Err(DbError::Conflict {
                message: format!(
                    "Cannot delete package with existing charges ({}) or payments ({}). Delete them first.",
                    charge_count, payment_count
                ),
            });
        }

        let sql = format!("SELECT {} FROM documents WHERE package_id = $1", DOCUMENT_COLUMNS);
        let documents: Vec<Document> = sqlx::query_as(&sql).bind(id).fetch_all(&mut *tx).await?;

        sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%id, documents = documents.len(), "deleted package");
        Ok(documents)
    }
}
