// src/main.rs
use axum::http::{header, HeaderName, HeaderValue, Method};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod feeds;
mod logging_middleware;
mod router;
mod services;

use common::{AppConfig, AppState};
use services::{GoogleProvider, OAuthProvider};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let provider: Option<Arc<dyn OAuthProvider>> = match &config.google {
        Some(google) => match GoogleProvider::new(google) {
            Ok(provider) => {
                info!(redirect_url = %google.redirect_url, "Google OAuth enabled");
                Some(Arc::new(provider) as Arc<dyn OAuthProvider>)
            }
            Err(e) => {
                warn!(error = %e, "Invalid Google OAuth URL configuration, OAuth disabled");
                None
            }
        },
        None => {
            warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, Google OAuth disabled");
            None
        }
    };

    let app_state = Arc::new(AppState::new(pool, &config, provider));
    info!(
        token_lifetime_min = config.jwt_expiration_min,
        "Application state initialized"
    );

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let app = router::build_router(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
