//! Business logic layer

pub mod access_scope;
pub mod asset_service;
pub mod audit_service;
pub mod auth_service;
pub mod export;
pub mod lifecycle;
pub mod report_service;
pub mod storage;
pub mod user_service;

pub use asset_service::AssetService;
pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use report_service::ReportService;
pub use storage::DocumentStore;
pub use user_service::UserService;
