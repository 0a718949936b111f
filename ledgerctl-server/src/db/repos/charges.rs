//! Charge repository
//!
//! Every write flags the charge, its package and the package's company in
//! the same transaction.

use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::Charge;

use super::updates::mark_package_updated;
use super::{DbError, CHARGE_COLUMNS};
use crate::models::ChargeDraft;

/// Charge repository
pub struct ChargeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ChargeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a single charge by ID.
    pub async fn get(&self, id: Uuid) -> Result<Charge, DbError> {
        let sql = format!("SELECT {} FROM charges WHERE id = $1", CHARGE_COLUMNS);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("charge", id))
    }

    /// Add a charge to a package.
    pub async fn create(&self, package_id: Uuid, draft: &ChargeDraft) -> Result<Charge, DbError> {
        let mut tx = self.pool.begin().await?;

        // Doubles as the package existence check
        mark_package_updated(&mut *tx, package_id).await?;

        let sql = format!(
            r#"
            INSERT INTO charges (package_id, description, amount, date, has_updates)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {}
            "#,
            CHARGE_COLUMNS
        );
        let charge: Charge = sqlx::query_as(&sql)
            .bind(package_id)
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(id = %charge.id, %package_id, amount = %charge.amount, "created charge");
        Ok(charge)
    }

    /// Replace a charge's fields.
    pub async fn update(&self, id: Uuid, draft: &ChargeDraft) -> Result<Charge, DbError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE charges
            SET description = $2, amount = $3, date = $4,
                has_updates = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CHARGE_COLUMNS
        );
        let charge: Charge = sqlx::query_as(&sql)
            .bind(id)
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("charge", id))?;

        mark_package_updated(&mut *tx, charge.package_id).await?;

        tx.commit().await?;
        tracing::info!(%id, amount = %charge.amount, "updated charge");
        Ok(charge)
    }

    /// Delete a charge; the package and company are flagged.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let package_id: Uuid = sqlx::query_scalar("DELETE FROM charges WHERE id = $1 RETURNING package_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("charge", id))?;

        mark_package_updated(&mut *tx, package_id).await?;

        tx.commit().await?;
        tracing::info!(%id, %package_id, "deleted charge");
        Ok(())
    }
}
