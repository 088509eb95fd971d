//! Relief Coordination Backend
//!
//! REST backend for relief camps, emergency alerts and resource
//! requests/donations, with SQLite persistence.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod geo;
mod models;
mod reconcile;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use errors::AppError;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting Relief Coordination Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Activity feed cap: {}", config.activity_cap);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (RELIEF_ADMIN_PSK). Admin writes are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool, config.activity_cap));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.admin_psk.clone();

    // Camp and alert writes are admin-only
    let admin_routes = Router::new()
        .route("/camps", post(api::create_camp))
        .route("/camps/{id}", delete(api::delete_camp))
        .route("/alerts", post(api::create_alert))
        .route("/alerts/{id}", put(api::update_alert))
        .route("/alerts/{id}", delete(api::delete_alert))
        .route_layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    let api_routes = Router::new()
        // Camps
        .route("/camps", get(api::list_camps))
        .route("/camps/nearby", get(api::nearby_camps))
        .route("/camps/{id}", get(api::get_camp))
        // Alerts
        .route("/alerts", get(api::list_alerts))
        .route("/alerts/area", get(api::alerts_in_area))
        .route("/alerts/{id}", get(api::get_alert))
        // Resources
        .route("/resources", get(api::list_resources))
        .route("/resources/camps", get(api::list_resource_camps))
        .route("/resources/inventory", get(api::get_inventory))
        .route("/resources/request", post(api::request_resource))
        .route("/resources/donate", post(api::donate_resource))
        .route("/resources/{id}", get(api::get_resource))
        // Dashboard
        .route("/dashboard/stats", get(api::dashboard_stats))
        .route("/dashboard/trends", get(api::dashboard_trends))
        .route("/dashboard/recent-activities", get(api::recent_activities))
        // Activity feed
        .route("/activities", get(api::list_activities))
        .route("/activities", post(api::create_activity))
        // Accounts
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/auth/users", get(api::list_users))
        .merge(admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.repo.ping().await?;
    Ok("OK")
}
