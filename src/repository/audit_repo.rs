//! Audit log data access

use crate::{
    error::AppError,
    models::audit::{AuditLog, AuditLogFilters},
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct AuditRepository {
    db: PgPool,
}

impl AuditRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<Uuid>,
        details: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (actor_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(actor_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn list(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
    ) -> Result<Vec<AuditLog>, AppError> {
        let mut query = String::from("SELECT * FROM audit_log WHERE 1=1");
        let mut index = 0;

        if filters.action.is_some() {
            index += 1;
            query.push_str(&format!(" AND action = ${}", index));
        }
        if filters.actor_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND actor_id = ${}", index));
        }
        query.push_str(&format!(" ORDER BY occurred_at DESC LIMIT ${}", index + 1));

        let mut query_builder = sqlx::query_as::<_, AuditLog>(&query);
        if let Some(action) = &filters.action {
            query_builder = query_builder.bind(action);
        }
        if let Some(actor_id) = filters.actor_id {
            query_builder = query_builder.bind(actor_id);
        }

        let rows = query_builder.bind(limit).fetch_all(&self.db).await?;
        Ok(rows)
    }

    /// Whether any audit row references the user, for the delete footprint
    /// check.
    pub async fn user_has_rows(&self, actor_id: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM audit_log WHERE actor_id = $1 LIMIT 1")
            .bind(actor_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }
}
