//! Payment repository
//!
//! Same flagging rules as charges. Amount positivity is validated in the
//! request model and enforced again by a CHECK constraint.

use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::Payment;

use super::updates::mark_package_updated;
use super::{DbError, PAYMENT_COLUMNS};
use crate::models::PaymentDraft;

/// Payment repository
pub struct PaymentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a single payment by ID.
    pub async fn get(&self, id: Uuid) -> Result<Payment, DbError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("payment", id))
    }

    /// Record a payment against a package.
    pub async fn create(&self, package_id: Uuid, draft: &PaymentDraft) -> Result<Payment, DbError> {
        let mut tx = self.pool.begin().await?;

        mark_package_updated(&mut *tx, package_id).await?;

        let sql = format!(
            r#"
            INSERT INTO payments (package_id, description, amount, date, has_updates)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let payment: Payment = sqlx::query_as(&sql)
            .bind(package_id)
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(id = %payment.id, %package_id, amount = %payment.amount, "recorded payment");
        Ok(payment)
    }

    /// Replace a payment's fields.
    pub async fn update(&self, id: Uuid, draft: &PaymentDraft) -> Result<Payment, DbError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE payments
            SET description = $2, amount = $3, date = $4,
                has_updates = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let payment: Payment = sqlx::query_as(&sql)
            .bind(id)
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("payment", id))?;

        mark_package_updated(&mut *tx, payment.package_id).await?;

        tx.commit().await?;
        tracing::info!(%id, amount = %payment.amount, "updated payment");
        Ok(payment)
    }

    /// Delete a payment; the package and company are flagged.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let package_id: Uuid = sqlx::query_scalar("DELETE FROM payments WHERE id = $1 RETURNING package_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("payment", id))?;

        mark_package_updated(&mut *tx, package_id).await?;

        tx.commit().await?;
        tracing::info!(%id, %package_id, "deleted payment");
        Ok(())
    }
}
