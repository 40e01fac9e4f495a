//! Asset handlers
//!
//! All handlers resolve the acting user from the database first; the
//! access scope and the lifecycle rules live in the service layer. Rule
//! warnings travel back alongside the result instead of failing the
//! request.

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::asset::{AssetListFilters, CreateAssetRequest, UpdateAssetRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(filters): Query<AssetListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let assets = state.asset_service.list(&actor, &filters).await?;
    Ok(Json(json!({
        "count": assets.len(),
        "assets": assets,
    })))
}

pub async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let summary = state.asset_service.dashboard_summary(&actor).await?;
    let status_counts: BTreeMap<String, i64> = summary.status_counts.into_iter().collect();
    let type_counts: BTreeMap<String, i64> = summary.type_counts.into_iter().collect();
    let province_counts: BTreeMap<String, i64> = summary.province_counts.into_iter().collect();
    Ok(Json(json!({
        "status_counts": status_counts,
        "type_counts": type_counts,
        "province_counts": province_counts,
    })))
}

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let outcome = state.asset_service.create(&actor, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Asset registered",
            "asset": outcome.value,
            "warnings": outcome.warnings,
        })),
    ))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let (asset, activity, documents) = state.asset_service.get(&actor, id).await?;
    Ok(Json(json!({
        "asset": asset,
        "activity": activity,
        "documents": documents,
    })))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let outcome = state.asset_service.update(&actor, id, &req).await?;
    Ok(Json(json!({
        "message": "Asset updated",
        "asset": outcome.value,
        "warnings": outcome.warnings,
    })))
}

/// Archiving is the delete operation; asset rows are never removed.
pub async fn archive_asset(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let outcome = state.asset_service.archive(&actor, id).await?;
    Ok(Json(json!({
        "message": "Asset archived",
        "asset": outcome.value,
        "warnings": outcome.warnings,
    })))
}

pub async fn download_document(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let (doc, bytes) = state.asset_service.download_document(&actor, id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        doc.original_filename.replace(['"', '\r', '\n'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
