//! User administration handlers (IT only)

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::user::{CreateUserRequest, UpdateUserRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let users = state.user_service.list(&actor).await?;
    Ok(Json(json!({
        "count": users.len(),
        "users": users,
    })))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let user = state.user_service.get(&actor, id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let user = state.user_service.create(&actor, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created",
            "user": user,
        })),
    ))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let user = state.user_service.update(&actor, id, &req).await?;
    Ok(Json(json!({
        "message": "User updated",
        "user": user,
    })))
}

pub async fn toggle_active(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    let user = state.user_service.toggle_active(&actor, id).await?;
    let message = if user.active { "User activated" } else { "User deactivated" };
    Ok(Json(json!({
        "message": message,
        "user": user,
    })))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    state.user_service.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

/// IT-initiated password reset for another user. Returns the reset link
/// for out-of-band delivery.
pub async fn reset_user_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    if !actor.is_it() {
        return Err(AppError::Forbidden);
    }
    let issued = state.auth_service.admin_reset(actor.user_id, id).await?;
    Ok(Json(json!({
        "message": "Password reset link issued",
        "reset_url": issued.reset_url,
    })))
}
