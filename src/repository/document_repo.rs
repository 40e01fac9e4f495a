//! Evidence document metadata access

use crate::{error::AppError, models::activity::AssetDocument};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct DocumentRepository {
    db: PgPool,
}

impl DocumentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        asset_id: Uuid,
        actor_id: Uuid,
        doc_type: &str,
        original_filename: &str,
        stored_filename: &str,
    ) -> Result<AssetDocument, AppError> {
        let doc = sqlx::query_as::<_, AssetDocument>(
            r#"
            INSERT INTO asset_documents (asset_id, actor_id, doc_type, original_filename, stored_filename)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(actor_id)
        .bind(doc_type)
        .bind(original_filename)
        .bind(stored_filename)
        .fetch_one(&mut **tx)
        .await?;

        Ok(doc)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<AssetDocument>, AppError> {
        let doc = sqlx::query_as::<_, AssetDocument>("SELECT * FROM asset_documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(doc)
    }

    pub async fn list_for_asset(&self, asset_id: Uuid) -> Result<Vec<AssetDocument>, AppError> {
        let docs = sqlx::query_as::<_, AssetDocument>(
            "SELECT * FROM asset_documents WHERE asset_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.db)
        .await?;

        Ok(docs)
    }

    /// Whether any document row references the user, for the delete
    /// footprint check.
    pub async fn user_has_rows(&self, actor_id: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM asset_documents WHERE actor_id = $1 LIMIT 1")
            .bind(actor_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    /// Whether the asset already has a document of the given kind on file.
    pub async fn has_doc_of_type(&self, asset_id: Uuid, doc_type: &str) -> Result<bool, AppError> {
        let row =
            sqlx::query("SELECT 1 FROM asset_documents WHERE asset_id = $1 AND doc_type = $2 LIMIT 1")
                .bind(asset_id)
                .bind(doc_type)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.is_some())
    }
}
