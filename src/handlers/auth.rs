//! Authentication handlers

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::{
        auth::{LoginRequest, RefreshTokenRequest},
        user::{ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest},
    },
};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(&req).await?;
    Ok(Json(response))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(response))
}

/// Current user, resolved from the database rather than the token so that
/// role and jurisdiction edits show up immediately.
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.actor(&auth_context).await?;
    Ok(Json(json!({
        "id": actor.user_id,
        "username": actor.username,
        "role": actor.role.as_str(),
        "province": actor.province,
        "district": actor.district,
    })))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .change_password(auth_context.user_id, &req)
        .await?;
    Ok(Json(json!({ "message": "Password changed" })))
}

/// Self-service reset request. The reset link is returned in the response
/// for delivery outside the system.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.auth_service.forgot_password(&req).await?;
    Ok(Json(json!({
        "message": "Password reset link issued",
        "reset_url": issued.reset_url,
    })))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.reset_password(&req).await?;
    Ok(Json(json!({ "message": "Password has been reset" })))
}
