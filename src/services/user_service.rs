//! User administration (IT only)
//!
//! Creation, editing, activation toggling and deletion. Deletion is only
//! allowed for users with no footprint anywhere in the system; anyone who
//! ever touched an asset, a document or the audit log can only be
//! deactivated, so history keeps its author.

use crate::{
    auth::PasswordHasher,
    error::AppError,
    locations::{self, HEAD_OFFICE},
    models::{
        audit::AuditAction,
        user::{CreateUserRequest, Role, UpdateUserRequest, User, UserResponse},
    },
    repository::{ActivityRepository, DocumentRepository, UserRepository},
    services::{access_scope::ActorContext, audit_service::AuditService},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct UserService {
    users: UserRepository,
    activities: ActivityRepository,
    documents: DocumentRepository,
    hasher: PasswordHasher,
    audit: Arc<AuditService>,
    password_min_length: usize,
}

/// Role-dependent location assignment shared by create and update.
/// AdminProvince gets the full comma-joined district list as its marker;
/// AdminDistrict must name a real province and district.
fn resolve_location(
    role: Role,
    province: Option<&str>,
    district: Option<&str>,
) -> Result<(Option<String>, Option<String>), AppError> {
    let province = province.map(str::trim).filter(|s| !s.is_empty());
    let district = district.map(str::trim).filter(|s| !s.is_empty());

    match role {
        Role::AdminProvince => {
            let p = province.ok_or_else(|| {
                AppError::Validation(vec![
                    "Province is required for Admin (Province) users".to_string(),
                ])
            })?;
            if !locations::province_exists(p) {
                return Err(AppError::Validation(vec![format!("Unknown province: {}", p)]));
            }
            Ok((Some(p.to_string()), locations::joined_districts(p)))
        }
        Role::AdminDistrict => {
            let p = province.filter(|p| *p != HEAD_OFFICE).ok_or_else(|| {
                AppError::Validation(vec![
                    "Valid province is required for Admin (District) users".to_string(),
                ])
            })?;
            let d = district.ok_or_else(|| {
                AppError::Validation(vec![
                    "District is required for Admin (District) users".to_string(),
                ])
            })?;
            if !locations::is_valid_location(p, d) {
                return Err(AppError::Validation(vec![format!(
                    "Unknown district {} for province {}",
                    d, p
                )]));
            }
            Ok((Some(p.to_string()), Some(d.to_string())))
        }
        _ => Ok((
            province.map(str::to_string),
            district.map(str::to_string),
        )),
    }
}

impl UserService {
    pub fn new(db: sqlx::PgPool, audit: Arc<AuditService>, password_min_length: usize) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            activities: ActivityRepository::new(db.clone()),
            documents: DocumentRepository::new(db),
            hasher: PasswordHasher::new(),
            audit,
            password_min_length,
        }
    }

    fn require_it(actor: &ActorContext) -> Result<(), AppError> {
        if actor.is_it() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub async fn list(&self, actor: &ActorContext) -> Result<Vec<UserResponse>, AppError> {
        Self::require_it(actor)?;
        let users = self.users.list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, actor: &ActorContext, id: Uuid) -> Result<UserResponse, AppError> {
        Self::require_it(actor)?;
        let user = self.users.get(id).await?.ok_or(AppError::NotFound)?;
        Ok(UserResponse::from(&user))
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        req: &CreateUserRequest,
    ) -> Result<UserResponse, AppError> {
        Self::require_it(actor)?;
        req.validate()
            .map_err(|e| AppError::Validation(flatten_validation(e)))?;

        let role = Role::parse(req.role.trim())
            .ok_or_else(|| AppError::Validation(vec!["Invalid role selected".to_string()]))?;
        PasswordHasher::validate_password_policy(&req.password, self.password_min_length)?;

        let username = req.username.trim();
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Validation(vec!["Username already exists".to_string()]));
        }

        let (province, district) =
            resolve_location(role, req.province.as_deref(), req.district.as_deref())?;
        let hash = self.hasher.hash(&req.password)?;

        let user = self
            .users
            .insert(
                username,
                &hash,
                role.as_str(),
                province.as_deref(),
                district.as_deref(),
                req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            )
            .await?;

        info!(user_id = %user.id, role = role.as_str(), "User created");
        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::UserCreate,
                Some("user"),
                Some(user.id),
                Some(&user.username),
            )
            .await;
        Ok(UserResponse::from(&user))
    }

    pub async fn update(
        &self,
        actor: &ActorContext,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        Self::require_it(actor)?;
        req.validate()
            .map_err(|e| AppError::Validation(flatten_validation(e)))?;

        let existing = self.users.get(id).await?.ok_or(AppError::NotFound)?;
        let role = Role::parse(req.role.trim())
            .ok_or_else(|| AppError::Validation(vec!["Invalid role selected".to_string()]))?;

        let username = req.username.trim();
        if let Some(other) = self.users.find_by_username(username).await? {
            if other.id != existing.id {
                return Err(AppError::Validation(vec!["Username already exists".to_string()]));
            }
        }

        let (province, district) =
            resolve_location(role, req.province.as_deref(), req.district.as_deref())?;

        let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                PasswordHasher::validate_password_policy(password, self.password_min_length)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        let user = self
            .users
            .update(
                id,
                username,
                role.as_str(),
                province.as_deref(),
                district.as_deref(),
                req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
                password_hash.as_deref(),
            )
            .await?
            .ok_or(AppError::NotFound)?;

        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::UserUpdate,
                Some("user"),
                Some(user.id),
                Some(&user.username),
            )
            .await;
        Ok(UserResponse::from(&user))
    }

    /// Flip active. Users cannot lock themselves out.
    pub async fn toggle_active(
        &self,
        actor: &ActorContext,
        id: Uuid,
    ) -> Result<UserResponse, AppError> {
        Self::require_it(actor)?;
        if actor.user_id == id {
            return Err(AppError::Validation(vec![
                "Cannot change active state of your own account".to_string(),
            ]));
        }
        let user = self.users.get(id).await?.ok_or(AppError::NotFound)?;
        let user = self
            .users
            .set_active(id, !user.active)
            .await?
            .ok_or(AppError::NotFound)?;

        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::UserToggleActive,
                Some("user"),
                Some(user.id),
                Some(&user.username),
            )
            .await;
        Ok(UserResponse::from(&user))
    }

    pub async fn delete(&self, actor: &ActorContext, id: Uuid) -> Result<(), AppError> {
        Self::require_it(actor)?;
        if actor.user_id == id {
            return Err(AppError::Validation(vec![
                "Cannot delete your own account".to_string(),
            ]));
        }
        let user = self.users.get(id).await?.ok_or(AppError::NotFound)?;

        let has_footprint = self.users.has_created_assets(id).await?
            || self.activities.user_has_rows(id).await?
            || self.documents.user_has_rows(id).await?
            || self.audit.user_has_rows(id).await?;
        if has_footprint {
            self.audit
                .record(
                    Some(actor.user_id),
                    AuditAction::UserDeleteRejected,
                    Some("user"),
                    Some(user.id),
                    Some("has_history"),
                )
                .await;
            return Err(AppError::Validation(vec![
                "Cannot delete user with historical activity. Deactivate the user instead."
                    .to_string(),
            ]));
        }

        self.users.delete(id).await?;
        self.audit
            .record(
                Some(actor.user_id),
                AuditAction::UserDelete,
                Some("user"),
                Some(user.id),
                Some(&user.username),
            )
            .await;
        Ok(())
    }

    /// Create the bootstrap IT account when the users table is empty.
    /// Runs once at startup.
    pub async fn bootstrap_admin(
        &self,
        bootstrap_password: &secrecy::Secret<String>,
    ) -> Result<Option<User>, AppError> {
        if self.users.count().await? > 0 {
            return Ok(None);
        }
        let hash = self.hasher.hash(bootstrap_password.expose_secret())?;
        let user = self
            .users
            .insert("admin", &hash, Role::It.as_str(), Some(HEAD_OFFICE), None, None)
            .await?;
        info!(user_id = %user.id, "Bootstrap IT account created");
        Ok(Some(user))
    }
}

fn flatten_validation(errors: validator::ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| format!("{}: {}", field, m))
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_province_gets_joined_district_marker() {
        let (province, district) =
            resolve_location(Role::AdminProvince, Some("Masvingo"), None).unwrap();
        assert_eq!(province.as_deref(), Some("Masvingo"));
        let marker = district.unwrap();
        assert!(marker.contains(','));
        assert!(marker.contains("Bikita"));
        assert!(marker.contains("Zaka"));
    }

    #[test]
    fn test_admin_district_requires_real_location() {
        assert!(resolve_location(Role::AdminDistrict, Some("Head Office"), Some("x")).is_err());
        assert!(resolve_location(Role::AdminDistrict, Some("Harare"), None).is_err());
        assert!(resolve_location(Role::AdminDistrict, Some("Harare"), Some("Mutare")).is_err());

        let (province, district) =
            resolve_location(Role::AdminDistrict, Some("Harare"), Some("Harare District"))
                .unwrap();
        assert_eq!(province.as_deref(), Some("Harare"));
        assert_eq!(district.as_deref(), Some("Harare District"));
    }

    #[test]
    fn test_other_roles_keep_submitted_location() {
        let (province, district) = resolve_location(Role::Viewer, Some("Midlands"), None).unwrap();
        assert_eq!(province.as_deref(), Some("Midlands"));
        assert_eq!(district, None);

        let (province, district) = resolve_location(Role::It, None, None).unwrap();
        assert_eq!(province, None);
        assert_eq!(district, None);
    }
}
