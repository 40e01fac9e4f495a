//! Audit log handlers (IT only)

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState,
    models::audit::AuditLogFilters,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_LIMIT: i64 = 200;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub actor_id: Option<Uuid>,
    pub limit: Option<i64>,
}

pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    if !actor.is_it() {
        return Err(AppError::Forbidden);
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let filters = AuditLogFilters {
        action: query.action,
        actor_id: query.actor_id,
    };
    let logs = state.audit_service.list(&filters, limit).await?;

    Ok(Json(json!({
        "count": logs.len(),
        "logs": logs,
    })))
}
