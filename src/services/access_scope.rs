//! Access scope filter
//! Narrows every asset read and write to the acting user's jurisdiction

use crate::{
    error::AppError,
    locations::HEAD_OFFICE,
    models::user::{Role, User},
};
use uuid::Uuid;

/// The acting user, resolved from the database on every request so that
/// deactivation and jurisdiction changes take effect immediately.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub province: Option<String>,
    pub district: Option<String>,
}

impl ActorContext {
    pub fn from_user(user: &User) -> Result<Self, AppError> {
        if !user.active {
            return Err(AppError::Unauthorized);
        }
        let role = user.role().ok_or(AppError::Forbidden)?;
        Ok(ActorContext {
            user_id: user.id,
            username: user.username.clone(),
            role,
            province: user.province.clone(),
            district: user.district.clone(),
        })
    }

    pub fn is_it(&self) -> bool {
        self.role == Role::It
    }

    pub fn scope(&self) -> AccessScope {
        AccessScope::for_actor(self)
    }
}

/// Jurisdiction scope applied to asset queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// IT role or Head Office users: no restriction.
    Unrestricted,
    /// Restricted to one province.
    Province { province: String },
    /// Restricted to one district within a province.
    District { province: String, district: String },
}

impl AccessScope {
    pub fn for_actor(actor: &ActorContext) -> AccessScope {
        if actor.role == Role::It {
            return AccessScope::Unrestricted;
        }
        let province = match actor.province.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return AccessScope::Unrestricted,
        };
        if province == HEAD_OFFICE {
            return AccessScope::Unrestricted;
        }
        match actor.district.as_deref() {
            Some(d) if !d.is_empty() => {
                // A comma-joined district list is a province-admin marker,
                // not a filter value. AdminDistrict always filters on its
                // stored district string.
                if actor.role == Role::AdminDistrict || !d.contains(',') {
                    AccessScope::District {
                        province,
                        district: d.to_string(),
                    }
                } else {
                    AccessScope::Province { province }
                }
            }
            _ => AccessScope::Province { province },
        }
    }

    pub fn province(&self) -> Option<&str> {
        match self {
            AccessScope::Unrestricted => None,
            AccessScope::Province { province } => Some(province),
            AccessScope::District { province, .. } => Some(province),
        }
    }

    pub fn district(&self) -> Option<&str> {
        match self {
            AccessScope::District { district, .. } => Some(district),
            _ => None,
        }
    }

    /// Whether an asset at the given location falls inside this scope.
    pub fn permits(&self, province: Option<&str>, district: Option<&str>) -> bool {
        match self {
            AccessScope::Unrestricted => true,
            AccessScope::Province { province: p } => province == Some(p.as_str()),
            AccessScope::District { province: p, district: d } => {
                province == Some(p.as_str()) && district == Some(d.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, province: Option<&str>, district: Option<&str>) -> ActorContext {
        ActorContext {
            user_id: Uuid::new_v4(),
            username: "tester".to_string(),
            role,
            province: province.map(|s| s.to_string()),
            district: district.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_it_is_unrestricted() {
        let scope = actor(Role::It, Some("Harare"), Some("Harare District")).scope();
        assert_eq!(scope, AccessScope::Unrestricted);
        assert!(scope.permits(Some("Bulawayo"), None));
    }

    #[test]
    fn test_head_office_is_unrestricted() {
        let scope = actor(Role::Admin, Some("Head Office"), None).scope();
        assert_eq!(scope, AccessScope::Unrestricted);
    }

    #[test]
    fn test_district_admin_is_district_scoped() {
        let scope = actor(Role::AdminDistrict, Some("Harare"), Some("Harare District")).scope();
        assert!(scope.permits(Some("Harare"), Some("Harare District")));
        assert!(!scope.permits(Some("Harare"), Some("Epworth")));
        assert!(!scope.permits(Some("Bulawayo"), Some("Bulawayo District")));
    }

    #[test]
    fn test_province_admin_marker_is_not_a_district_filter() {
        // AdminProvince carries the comma-joined district list; the list is
        // a marker and must not be used as a single district value.
        let scope =
            actor(Role::AdminProvince, Some("Masvingo"), Some("Bikita, Chiredzi, Chivi")).scope();
        assert_eq!(
            scope,
            AccessScope::Province { province: "Masvingo".to_string() }
        );
        assert!(scope.permits(Some("Masvingo"), Some("Zaka")));
        assert!(!scope.permits(Some("Harare"), Some("Harare District")));
    }

    #[test]
    fn test_single_district_admin_role_is_district_scoped() {
        // A non-AdminDistrict role with a single district value still
        // filters on it.
        let scope = actor(Role::Admin, Some("Bulawayo"), Some("Bulawayo District")).scope();
        assert_eq!(scope.district(), Some("Bulawayo District"));
    }

    #[test]
    fn test_inactive_user_rejected() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ghost".to_string(),
            password_hash: String::new(),
            role: "Admin".to_string(),
            province: Some("Harare".to_string()),
            district: None,
            active: false,
            email: None,
            created_at: chrono::Utc::now(),
        };
        assert!(matches!(ActorContext::from_user(&user), Err(AppError::Unauthorized)));
    }
}
