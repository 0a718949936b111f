//! `has_updates` propagation.
//!
//! Writes to charges, payments and documents flag their package and the
//! package's company. Callers run these inside the same transaction as the
//! write itself.

use sqlx::PgConnection;
use uuid::Uuid;

use super::DbError;

/// Flag a package and its company as updated.
///
/// Returns the owning company id. Fails with `NotFound` when the package
/// does not exist, which callers rely on as their existence check.
pub(crate) async fn mark_package_updated(
    conn: &mut PgConnection,
    package_id: Uuid,
) -> Result<Uuid, DbError> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE packages
        SET has_updates = TRUE, updated_at = NOW()
        WHERE id = $1
        RETURNING company_id
        "#,
    )
    .bind(package_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (company_id,) = row.ok_or_else(|| DbError::not_found("package", package_id))?;

    sqlx::query("UPDATE companies SET has_updates = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(company_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(%package_id, %company_id, "flagged package and company as updated");
    Ok(company_id)
}
