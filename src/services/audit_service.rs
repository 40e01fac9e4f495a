//! Audit trail service
//!
//! Records system actions (logins, views, mutations, exports). Audit
//! writes never fail the request they describe; failures are logged and
//! dropped.

use crate::{
    models::audit::{AuditAction, AuditLog, AuditLogFilters},
    repository::AuditRepository,
};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

pub struct AuditService {
    repo: AuditRepository,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { repo: AuditRepository::new(db) }
    }

    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: AuditAction,
        entity_type: Option<&str>,
        entity_id: Option<Uuid>,
        details: Option<&str>,
    ) {
        if let Err(e) = self
            .repo
            .insert(actor_id, action.as_str(), entity_type, entity_id, details)
            .await
        {
            error!(action = action.as_str(), "Failed to write audit record: {}", e);
        }
    }

    pub async fn record_asset(
        &self,
        actor_id: Uuid,
        action: AuditAction,
        asset_id: Uuid,
        details: Option<&str>,
    ) {
        self.record(Some(actor_id), action, Some("asset"), Some(asset_id), details)
            .await;
    }

    pub async fn list(
        &self,
        filters: &AuditLogFilters,
        limit: i64,
    ) -> Result<Vec<AuditLog>, crate::error::AppError> {
        self.repo.list(filters, limit).await
    }

    pub async fn user_has_rows(&self, actor_id: Uuid) -> Result<bool, crate::error::AppError> {
        self.repo.user_has_rows(actor_id).await
    }
}
