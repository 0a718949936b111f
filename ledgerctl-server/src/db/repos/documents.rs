//! Document repository
//!
//! Rows only; the files themselves live in `crate::storage`.

use sqlx::PgPool;
use uuid::Uuid;

use ledgerctl_core::Document;

use super::updates::mark_package_updated;
use super::{DbError, DOCUMENT_COLUMNS};

/// Fields of a stored upload
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub url: String,
    pub mime_type: String,
}

/// Document repository
pub struct DocumentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Documents attached to a package, newest first.
    pub async fn list_for_package(&self, package_id: Uuid) -> Result<Vec<Document>, DbError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM packages WHERE id = $1)")
            .bind(package_id)
            .fetch_one(self.pool)
            .await?;
        if !exists.0 {
            return Err(DbError::not_found("package", package_id));
        }

        let sql = format!(
            "SELECT {} FROM documents WHERE package_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        );
        let documents = sqlx::query_as(&sql)
            .bind(package_id)
            .fetch_all(self.pool)
            .await?;
        Ok(documents)
    }

    /// Record an uploaded file against a package and its company.
    ///
    /// Each call is its own transaction: in a multi-file upload, earlier
    /// files stay recorded when a later one fails.
    pub async fn create(&self, package_id: Uuid, doc: &NewDocument) -> Result<Document, DbError> {
        let mut tx = self.pool.begin().await?;

        let company_id = mark_package_updated(&mut *tx, package_id).await?;

        let sql = format!(
            r#"
            INSERT INTO documents (company_id, package_id, url, name, mime_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );
        let document: Document = sqlx::query_as(&sql)
            .bind(company_id)
            .bind(package_id)
            .bind(&doc.url)
            .bind(&doc.name)
            .bind(&doc.mime_type)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(id = %document.id, %package_id, name = %document.name, "recorded document");
        Ok(document)
    }

    /// Delete a document row, returning it so the file can be removed.
    pub async fn delete(&self, id: Uuid) -> Result<Document, DbError> {
        let sql = format!("DELETE FROM documents WHERE id = $1 RETURNING {}", DOCUMENT_COLUMNS);
        let document: Document = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("document", id))?;

        tracing::info!(%id, "deleted document");
        Ok(document)
    }
}
