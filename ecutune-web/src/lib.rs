//! ecutune-web library - HTTP service for the ECU remapping site
//!
//! Serves the cascading vehicle selector, accepts quote requests (leads)
//! and exposes a token-protected admin API for reviewing them.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use ecutune_common::auth::token_digest;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod extract;
pub mod pagination;

/// Largest request body accepted by any route
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// SHA-256 digest of the admin token; `None` disables the admin API
    pub admin_token_digest: Option<String>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, admin_token: Option<&str>) -> Self {
        let admin_token_digest = admin_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(token_digest);

        Self {
            db,
            admin_token_digest,
        }
    }
}

/// Build application router
///
/// Admin routes sit behind the bearer-token middleware; everything else is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require admin token)
    let admin = Router::new()
        .route("/api/admin/leads", get(api::list_leads))
        .route("/api/admin/leads/:guid", get(api::get_lead))
        .route("/api/admin/leads/:guid/status", put(api::update_lead_status))
        .route("/api/admin/vehicles/stats", get(api::vehicle_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::admin_auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/vehicles/fuels", get(api::list_fuels))
        .route("/api/vehicles/brands", get(api::list_brands))
        .route("/api/vehicles/models", get(api::list_models))
        .route("/api/vehicles/versions", get(api::list_versions))
        .route("/api/selector", get(api::get_selector))
        .route("/api/selector/choice", post(api::apply_choice))
        .route("/api/leads", post(api::submit_lead))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
