//! JWT token generation and validation
//! Access token + refresh token pattern

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Token type (access or refresh)
    pub token_type: String,
    /// Role name as stored on the user row
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // HS256 needs a reasonable minimum key length
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_exp_secs: config.security.access_token_exp_secs,
            refresh_token_exp_secs: config.security.refresh_token_exp_secs,
        })
    }

    fn generate(
        &self,
        user_id: &Uuid,
        username: &str,
        role: &str,
        token_type: &str,
        exp_secs: u64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(exp_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type: token_type.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode {} token: {:?}", token_type, e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    pub fn generate_token_pair(
        &self,
        user_id: &Uuid,
        username: &str,
        role: &str,
    ) -> Result<TokenPair, AppError> {
        let access_token =
            self.generate(user_id, username, role, "access", self.access_token_exp_secs)?;
        let refresh_token =
            self.generate(user_id, username, role, "refresh", self.refresh_token_exp_secs)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_token_exp_secs,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Unauthorized
            })?
            .claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "refresh" {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StorageConfig,
    };
    use secrecy::Secret;

    fn test_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                addr: "127.0.0.1:3000".to_string(),
                public_base_url: "http://localhost:3000".to_string(),
                graceful_shutdown_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: Secret::new("postgresql://localhost/test".to_string()),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
                access_token_exp_secs: 900,
                refresh_token_exp_secs: 604800,
                password_min_length: 8,
                reset_token_exp_hours: 2,
                bootstrap_admin_password: Secret::new("ChangeMe-Admin1!".to_string()),
            },
            storage: StorageConfig {
                uploads_dir: "/tmp/ict-inventory-test-uploads".to_string(),
            },
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = JwtService::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let pair = service.generate_token_pair(&user_id, "testuser", "IT").unwrap();

        let claims = service.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.role, "IT");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_token_type_validation() {
        let service = JwtService::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let pair = service.generate_token_pair(&user_id, "testuser", "Viewer").unwrap();

        assert!(service.validate_refresh_token(&pair.access_token).is_err());
        assert!(service.validate_access_token(&pair.refresh_token).is_err());
        assert!(service.validate_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_invalid_token_fails() {
        let service = JwtService::from_config(&test_config()).unwrap();
        assert!(service.validate_access_token("invalid_token").is_err());
    }
}
