use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use grpc_sso::auth::adapters::grpc;
use grpc_sso::auth::adapters::memory::MemoryStorage;
use grpc_sso::auth::adapters::postgres::PostgresStorage;
use grpc_sso::auth::domain::AuthError;
use grpc_sso::auth::password::PasswordHasher;
use grpc_sso::auth::{AppProvider, AuthService, UserStorage};
use grpc_sso::config::{Cli, Settings, StorageKind};
use grpc_sso::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_config(&cli.config).map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize logging
    logging::init(settings.env);
    info!(env = ?settings.env, "Starting sso server...");

    // Initialize storage
    let (user_storage, app_provider): (Arc<dyn UserStorage>, Arc<dyn AppProvider>) =
        match settings.storage.kind {
            StorageKind::Memory => {
                let storage = Arc::new(MemoryStorage::with_apps(settings.apps.clone()));
                (storage.clone() as Arc<dyn UserStorage>, storage as Arc<dyn AppProvider>)
            }
            StorageKind::Postgres => {
                let config = settings.storage.postgres.as_ref().ok_or_else(|| {
                    AuthError::ConfigError("Postgres configuration is missing".to_string())
                })?;
                let storage = Arc::new(PostgresStorage::connect(config).await.map_err(|e| {
                    error!("Failed to connect to postgres: {}", e);
                    e
                })?);
                (storage.clone() as Arc<dyn UserStorage>, storage as Arc<dyn AppProvider>)
            }
        };

    let hasher = PasswordHasher::new(&settings.hashing)?;
    let auth_service = Arc::new(AuthService::new(
        user_storage,
        app_provider,
        hasher,
        settings.token_ttl(),
    ));

    // Start gRPC server
    let addr = format!("{}:{}", settings.grpc.host, settings.grpc.port).parse()?;
    if let Err(e) = grpc::serve(auth_service, addr, settings.grpc.timeout(), shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

// Signal handling for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}
