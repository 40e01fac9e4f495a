//! Route registration
//! Builds the API router and applies middleware layers

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{handlers, middleware::AppState};

/// Evidence documents travel inline as base64, so the body limit is
/// generous.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh_token))
        .route("/api/v1/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(handlers::auth::reset_password));

    let authenticated_routes = Router::new()
        // Current user
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))
        .route("/api/v1/auth/change-password", put(handlers::auth::change_password))

        // Assets
        .route(
            "/api/v1/assets",
            get(handlers::asset::list_assets).post(handlers::asset::create_asset),
        )
        .route("/api/v1/assets/summary", get(handlers::asset::dashboard_summary))
        .route(
            "/api/v1/assets/{id}",
            get(handlers::asset::get_asset)
                .put(handlers::asset::update_asset)
                .delete(handlers::asset::archive_asset),
        )
        .route("/api/v1/documents/{id}", get(handlers::asset::download_document))

        // Reports
        .route("/api/v1/reports/suppliers", get(handlers::report::list_suppliers))
        .route("/api/v1/reports/movement", get(handlers::report::get_movement_report))
        .route(
            "/api/v1/reports/movement/export",
            get(handlers::report::export_movement_report),
        )
        .route("/api/v1/reports/{report_type}", get(handlers::report::get_asset_report))
        .route(
            "/api/v1/reports/{report_type}/export",
            get(handlers::report::export_asset_report),
        )
        .route("/api/v1/locations", get(handlers::report::get_locations))

        // User administration (IT only)
        .route(
            "/api/v1/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/api/v1/users/{id}/toggle-active", post(handlers::user::toggle_active))
        .route("/api/v1/users/{id}/reset-password", post(handlers::user::reset_user_password))

        // Audit log (IT only)
        .route("/api/v1/audit/logs", get(handlers::audit::list_audit_logs))
        .layer(from_fn_with_state(
            state.jwt_service.clone(),
            crate::auth::middleware::jwt_auth_middleware,
        ));

    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_export));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .merge(metrics_routes)
        .layer(from_fn(crate::middleware::request_tracking_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
