//! Authentication flows
//!
//! Login, token refresh, password change, and the password reset cycle.
//! Reset tokens are random, stored only as a SHA-256 hash, single use and
//! time boxed. There is no outbound mail; the reset link is returned to
//! the caller for delivery.

use crate::{
    auth::{JwtService, PasswordHasher},
    config::AppConfig,
    error::AppError,
    models::{
        auth::{LoginRequest, LoginResponse},
        audit::AuditAction,
        user::{ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest, User, UserResponse},
    },
    repository::UserRepository,
    services::audit_service::AuditService,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtService>,
    hasher: PasswordHasher,
    audit: Arc<AuditService>,
    password_min_length: usize,
    reset_token_exp_hours: i64,
    public_base_url: String,
}

/// The result of requesting a password reset. The link is always issued;
/// delivery is up to the caller.
#[derive(Debug)]
pub struct ResetIssued {
    pub user_id: Uuid,
    pub reset_url: String,
}

fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

impl AuthService {
    pub fn new(
        db: sqlx::PgPool,
        jwt: Arc<JwtService>,
        audit: Arc<AuditService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users: UserRepository::new(db),
            jwt,
            hasher: PasswordHasher::new(),
            audit,
            password_min_length: config.security.password_min_length,
            reset_token_exp_hours: config.security.reset_token_exp_hours,
            public_base_url: config.server.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AppError> {
        let username = req.username.trim();
        let user = self.users.find_by_username(username).await?;

        let user = match user {
            Some(u) if u.active => u,
            _ => {
                warn!(username = %username, "Login rejected");
                self.audit
                    .record(None, AuditAction::LoginFailed, Some("user"), None, Some(username))
                    .await;
                return Err(AppError::Unauthorized);
            }
        };

        if self.hasher.verify(&req.password, &user.password_hash).is_err() {
            self.audit
                .record(
                    Some(user.id),
                    AuditAction::LoginFailed,
                    Some("user"),
                    Some(user.id),
                    None,
                )
                .await;
            return Err(AppError::Unauthorized);
        }

        let pair = self.jwt.generate_token_pair(&user.id, &user.username, &user.role)?;
        info!(user_id = %user.id, "User logged in");
        self.audit
            .record(Some(user.id), AuditAction::Login, Some("user"), Some(user.id), None)
            .await;

        Ok(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            user: UserResponse::from(&user),
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, AppError> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;
        let user = self
            .users
            .get(user_id)
            .await?
            .filter(|u| u.active)
            .ok_or(AppError::Unauthorized)?;

        let pair = self.jwt.generate_token_pair(&user.id, &user.username, &user.role)?;
        Ok(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            user: UserResponse::from(&user),
        })
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: &ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = self.users.get(user_id).await?.ok_or(AppError::Unauthorized)?;

        if req.current_password.is_empty()
            || req.new_password.is_empty()
            || req.confirm_password.is_empty()
        {
            return Err(AppError::BadRequest("All password fields are required".to_string()));
        }
        if self
            .hasher
            .verify(&req.current_password, &user.password_hash)
            .is_err()
        {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }
        if req.new_password != req.confirm_password {
            return Err(AppError::BadRequest(
                "New password and confirmation do not match".to_string(),
            ));
        }
        PasswordHasher::validate_password_policy(&req.new_password, self.password_min_length)?;

        let hash = self.hasher.hash(&req.new_password)?;
        self.users.set_password_hash(user.id, &hash).await?;
        self.audit
            .record(
                Some(user.id),
                AuditAction::PasswordChanged,
                Some("user"),
                Some(user.id),
                None,
            )
            .await;
        Ok(())
    }

    /// Self-service reset request, by username or email.
    pub async fn forgot_password(
        &self,
        req: &ForgotPasswordRequest,
    ) -> Result<ResetIssued, AppError> {
        let user = match (
            req.username.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) {
            (Some(username), _) => self.users.find_by_username(username).await?,
            (None, Some(email)) => self.users.find_by_email(email).await?,
            (None, None) => None,
        };
        let user = user.ok_or(AppError::BadRequest("User not found".to_string()))?;

        let issued = self.issue_reset(&user).await?;
        self.audit
            .record(
                Some(user.id),
                AuditAction::PasswordResetRequested,
                Some("user"),
                Some(user.id),
                None,
            )
            .await;
        Ok(issued)
    }

    /// IT-initiated reset for another user.
    pub async fn admin_reset(&self, actor_id: Uuid, user_id: Uuid) -> Result<ResetIssued, AppError> {
        let user = self.users.get(user_id).await?.ok_or(AppError::NotFound)?;
        let issued = self.issue_reset(&user).await?;
        self.audit
            .record(
                Some(actor_id),
                AuditAction::PasswordResetRequested,
                Some("user"),
                Some(user.id),
                Some("admin_initiated"),
            )
            .await;
        Ok(issued)
    }

    async fn issue_reset(&self, user: &User) -> Result<ResetIssued, AppError> {
        let mut raw = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let expires_at = Utc::now() + Duration::hours(self.reset_token_exp_hours);
        self.users
            .insert_reset_token(user.id, &hash_token(&token), expires_at)
            .await?;

        Ok(ResetIssued {
            user_id: user.id,
            reset_url: format!("{}/reset/{}", self.public_base_url, token),
        })
    }

    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), AppError> {
        let record = self
            .users
            .find_reset_token(&hash_token(req.token.trim()))
            .await?
            .ok_or(AppError::BadRequest("Invalid or expired token".to_string()))?;
        if record.used || record.expires_at < Utc::now() {
            return Err(AppError::BadRequest("Invalid or expired token".to_string()));
        }

        PasswordHasher::validate_password_policy(&req.password, self.password_min_length)?;
        let user = self
            .users
            .get(record.user_id)
            .await?
            .ok_or(AppError::BadRequest("Invalid or expired token".to_string()))?;

        let hash = self.hasher.hash(&req.password)?;
        self.users.set_password_hash(user.id, &hash).await?;
        self.users.mark_reset_token_used(record.id).await?;
        self.audit
            .record(
                Some(user.id),
                AuditAction::PasswordResetCompleted,
                Some("user"),
                Some(user.id),
                None,
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_and_hex() {
        let h1 = hash_token("some-token");
        let h2 = hash_token("some-token");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h1, hash_token("other-token"));
    }
}
