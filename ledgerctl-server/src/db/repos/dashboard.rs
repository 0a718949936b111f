//! Dashboard statistics - one aggregate over all tables

use sqlx::PgPool;

use ledgerctl_core::DashboardStats;

use super::DbError;

pub struct DashboardRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DbError> {
        let stats = sqlx::query_as(
            r#"
            WITH totals AS (
                SELECT
                    (SELECT COALESCE(SUM(amount), 0) FROM charges) AS total_charges,
                    (SELECT COALESCE(SUM(amount), 0) FROM payments) AS total_payments
            )
            SELECT
                (SELECT COUNT(*) FROM companies WHERE company_type = 'CLIENT') AS client_count,
                (SELECT COUNT(*) FROM companies WHERE company_type = 'VENDOR') AS vendor_count,
                (SELECT COUNT(*) FROM packages) AS package_count,
                t.total_charges,
                t.total_payments,
                t.total_charges - t.total_payments AS outstanding,
                (SELECT COUNT(*) FROM companies WHERE has_updates) AS companies_with_updates
            FROM totals t
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
