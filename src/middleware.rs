//! HTTP middleware and shared application state

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    repository::UserRepository,
    services::access_scope::ActorContext,
};

/// Shared application state. Services are Arc-wrapped so cloning the
/// state per request is a pointer copy.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::AppConfig,
    pub db: sqlx::PgPool,
    pub jwt_service: Arc<crate::auth::JwtService>,
    pub auth_service: Arc<crate::services::AuthService>,
    pub asset_service: Arc<crate::services::AssetService>,
    pub report_service: Arc<crate::services::ReportService>,
    pub user_service: Arc<crate::services::UserService>,
    pub audit_service: Arc<crate::services::AuditService>,
    pub users: Arc<UserRepository>,
}

impl AppState {
    /// Resolve token claims into the current database user. Deactivation
    /// and role or jurisdiction changes apply on the next request, not at
    /// the next login.
    pub async fn actor(&self, auth: &AuthContext) -> Result<ActorContext, AppError> {
        let user = self
            .users
            .get(auth.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        ActorContext::from_user(&user)
    }
}

/// Per-request tracing span, request id header and metrics.
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();
        let response = next.run(req).await;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let status_label = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            422 => "422",
            500 => "500",
            _ => "other",
        };
        let method_label = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        metrics::counter!("http_requests_total", "method" => method_label, "status" => status_label)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        let mut response = response;
        if let Ok(value) = trace_id.parse() {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
    .instrument(span)
    .await
}

fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}
