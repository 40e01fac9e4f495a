//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Administrative roles, from unrestricted to read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "IT")]
    It,
    Admin,
    AdminProvince,
    AdminDistrict,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::It => "IT",
            Role::Admin => "Admin",
            Role::AdminProvince => "AdminProvince",
            Role::AdminDistrict => "AdminDistrict",
            Role::Viewer => "Viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "IT" => Some(Role::It),
            "Admin" => Some(Role::Admin),
            "AdminProvince" => Some(Role::AdminProvince),
            "AdminDistrict" => Some(Role::AdminDistrict),
            "Viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Roles allowed to create, edit and archive assets.
    pub fn can_edit_assets(&self) -> bool {
        matches!(self, Role::It | Role::Admin | Role::AdminProvince | Role::AdminDistrict)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub active: bool,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Create user request (IT only)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 80))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: String,
    pub province: Option<String>,
    pub district: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Update user request (IT only). Password is optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 80))]
    pub username: String,
    pub role: String,
    pub province: Option<String>,
    pub district: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Public user representation (no hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub province: Option<String>,
    pub district: Option<String>,
    pub active: bool,
    pub email: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            province: user.province.clone(),
            district: user.district.clone(),
            active: user.active,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Single-use, time-boxed password reset token. Only the SHA-256 hash of
/// the token is persisted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::It, Role::Admin, Role::AdminProvince, Role::AdminDistrict, Role::Viewer]
        {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("SuperUser"), None);
    }

    #[test]
    fn test_viewer_cannot_edit_assets() {
        assert!(!Role::Viewer.can_edit_assets());
        assert!(Role::AdminDistrict.can_edit_assets());
        assert!(Role::It.can_edit_assets());
    }
}
