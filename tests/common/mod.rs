//! Shared test helpers
//! Builds a full application state without touching a live database.

use ict_inventory::{
    auth::JwtService,
    config::{
        AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StorageConfig,
    },
    middleware::AppState,
    repository::UserRepository,
    services::{AssetService, AuditService, AuthService, DocumentStore, ReportService, UserService},
};
use secrecy::Secret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/ict_inventory_test".to_string()),
            max_connections: 2,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string()),
            access_token_exp_secs: 300,
            refresh_token_exp_secs: 3600,
            password_min_length: 8,
            reset_token_exp_hours: 2,
            bootstrap_admin_password: Secret::new("Test-Bootstrap1!".to_string()),
        },
        storage: StorageConfig {
            uploads_dir: std::env::temp_dir()
                .join("ict-inventory-tests")
                .to_string_lossy()
                .to_string(),
        },
    }
}

/// Application state over a lazy pool: no connection is made until a
/// handler actually queries, so routing and auth rejection paths can be
/// tested without Postgres.
pub fn create_test_state() -> Arc<AppState> {
    let config = create_test_config();
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy("postgresql://localhost/ict_inventory_test")
        .expect("lazy pool");

    let jwt_service = Arc::new(JwtService::from_config(&config).expect("jwt service"));
    let audit_service = Arc::new(AuditService::new(pool.clone()));
    let store = Arc::new(DocumentStore::new(&config.storage.uploads_dir));

    Arc::new(AppState {
        auth_service: Arc::new(AuthService::new(
            pool.clone(),
            jwt_service.clone(),
            audit_service.clone(),
            &config,
        )),
        asset_service: Arc::new(AssetService::new(
            pool.clone(),
            store,
            audit_service.clone(),
        )),
        report_service: Arc::new(ReportService::new(pool.clone(), audit_service.clone())),
        user_service: Arc::new(UserService::new(
            pool.clone(),
            audit_service.clone(),
            config.security.password_min_length,
        )),
        audit_service,
        jwt_service,
        users: Arc::new(UserRepository::new(pool.clone())),
        db: pool,
        config,
    })
}
