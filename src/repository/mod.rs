//! Data access layer

pub mod activity_repo;
pub mod asset_repo;
pub mod audit_repo;
pub mod document_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepository;
pub use asset_repo::AssetRepository;
pub use audit_repo::AuditRepository;
pub use document_repo::DocumentRepository;
pub use user_repo::UserRepository;
