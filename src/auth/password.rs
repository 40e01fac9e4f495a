//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// OWASP recommended parameters: m=64MiB, t=3 iterations, p=4 lanes
    pub fn new() -> Self {
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Self { argon2 }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Unauthorized)
    }

    /// Minimum-length policy from configuration.
    pub fn validate_password_policy(password: &str, min_length: usize) -> Result<(), AppError> {
        if password.len() < min_length {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                min_length
            )));
        }
        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        hasher.verify(password, &hash).unwrap();
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("TestPassword123!").unwrap();
        assert!(hasher.verify("WrongPassword", &hash).is_err());
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();
        assert_ne!(hash1, hash2);

        hasher.verify(password, &hash1).unwrap();
        hasher.verify(password, &hash2).unwrap();
    }

    #[test]
    fn test_password_policy_validation() {
        assert!(PasswordHasher::validate_password_policy("longenough", 8).is_ok());
        assert!(PasswordHasher::validate_password_policy("short", 8).is_err());
    }
}
