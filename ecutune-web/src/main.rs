//! ecutune-web - HTTP service for the ECU remapping site
//!
//! Commands:
//! - `serve` (default): vehicle selector, lead capture and admin API
//! - `import <catalog.toml>`: load vehicles into the lookup table

use anyhow::{Context, Result};
use clap::Parser;
use ecutune_common::config::{load_toml_config, RootFolderInitializer, ServiceConfig};
use ecutune_common::db::init_database;
use ecutune_common::vehicles::{import_catalog, load_catalog_file};
use ecutune_web::cli::{Args, Command};
use ecutune_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        load_toml_config(args.config.as_deref()).context("Failed to load config file")?;

    let config = ServiceConfig::resolve(args.overrides(), &toml_config);

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting ecutune-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match args.command() {
        Command::Import { catalog } => {
            info!("Importing catalog: {}", catalog.display());
            let vehicles = load_catalog_file(&catalog)
                .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
            let summary = import_catalog(&pool, &vehicles)
                .await
                .context("Catalog import failed")?;
            info!(
                "✓ Imported {} vehicles ({} already present)",
                summary.inserted, summary.skipped
            );
            pool.close().await;
            Ok(())
        }
        Command::Serve => serve(config, pool).await,
    }
}

async fn serve(config: ServiceConfig, pool: sqlx::SqlitePool) -> Result<()> {
    if config.admin_token.is_some() {
        info!("✓ Admin API enabled");
    } else {
        warn!("No admin token configured - admin API disabled");
    }

    let state = AppState::new(pool.clone(), config.admin_token.as_deref());
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("ecutune-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
