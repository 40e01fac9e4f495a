//! ICT asset register entry point

use ict_inventory::{
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::UserRepository,
    routes,
    services::{AssetService, AuditService, AuthService, DocumentStore, ReportService, UserService},
    telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("ict-inventory {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Load .env files in development; production sets env vars directly.
    if let Ok(env_name) = std::env::var("ICT_ENV") {
        dotenv::from_filename(format!(".env.{}", env_name)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ICT asset register starting...");

    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    let store = Arc::new(DocumentStore::new(&config.storage.uploads_dir));
    store.ensure_root().await?;

    let jwt_service = Arc::new(ict_inventory::auth::JwtService::from_config(&config)?);
    let audit_service = Arc::new(AuditService::new(db_pool.clone()));
    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        jwt_service.clone(),
        audit_service.clone(),
        &config,
    ));
    let asset_service = Arc::new(AssetService::new(
        db_pool.clone(),
        store.clone(),
        audit_service.clone(),
    ));
    let report_service = Arc::new(ReportService::new(db_pool.clone(), audit_service.clone()));
    let user_service = Arc::new(UserService::new(
        db_pool.clone(),
        audit_service.clone(),
        config.security.password_min_length,
    ));

    // First run: create the bootstrap IT account.
    if let Some(admin) = user_service
        .bootstrap_admin(&config.security.bootstrap_admin_password)
        .await?
    {
        tracing::warn!(
            username = %admin.username,
            "Bootstrap account created; change its password immediately"
        );
    }

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool.clone(),
        jwt_service,
        auth_service,
        asset_service,
        report_service,
        user_service,
        audit_service,
        users: Arc::new(UserRepository::new(db_pool.clone())),
    });

    let app = routes::create_router(app_state);

    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
    tracing::warn!("Graceful shutdown timeout reached, forcing exit");
}

fn print_help() {
    println!("ict-inventory {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: ict-inventory [options]");
    println!();
    println!("Options:");
    println!("  --version     Print the version and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Configuration:");
    println!("  All configuration is supplied through ICT_-prefixed environment variables.");
    println!("  See .env.example for the available settings.");
}
