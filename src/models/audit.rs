//! Audit log models
//! System-action log, distinct from the per-asset activity ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audited system actions
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    // Authentication
    Login,
    LoginFailed,
    Logout,
    PasswordChanged,
    PasswordResetRequested,
    PasswordResetCompleted,

    // Assets
    ViewDashboard,
    ViewAsset,
    AssetCreate,
    AssetUpdate,
    AssetArchive,

    // Reporting
    ViewReports,
    ExportReport,

    // Users
    UserCreate,
    UserUpdate,
    UserToggleActive,
    UserDelete,
    UserDeleteRejected,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "auth.login",
            AuditAction::LoginFailed => "auth.login_failed",
            AuditAction::Logout => "auth.logout",
            AuditAction::PasswordChanged => "auth.password_changed",
            AuditAction::PasswordResetRequested => "auth.password_reset_requested",
            AuditAction::PasswordResetCompleted => "auth.password_reset_completed",

            AuditAction::ViewDashboard => "asset.view_dashboard",
            AuditAction::ViewAsset => "asset.view",
            AuditAction::AssetCreate => "asset.create",
            AuditAction::AssetUpdate => "asset.update",
            AuditAction::AssetArchive => "asset.archive",

            AuditAction::ViewReports => "report.view",
            AuditAction::ExportReport => "report.export",

            AuditAction::UserCreate => "user.create",
            AuditAction::UserUpdate => "user.update",
            AuditAction::UserToggleActive => "user.toggle_active",
            AuditAction::UserDelete => "user.delete",
            AuditAction::UserDeleteRejected => "user.delete_rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogFilters {
    pub action: Option<String>,
    pub actor_id: Option<Uuid>,
}
