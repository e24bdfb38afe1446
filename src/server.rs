//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Holocron API.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, characters};
use crate::repositories::RepositoryError;
use crate::services::{CharacterService, SharedCharacterService};
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub characters: SharedCharacterService,
}

impl AppState {
    /// Wires the services over an open connection.
    ///
    /// Fails when an entity's identity column cannot be resolved.
    pub fn build(config: Arc<AppConfig>, db: DatabaseConnection) -> Result<Self, RepositoryError> {
        let characters = CharacterService::for_characters(Arc::new(db.clone()))?;
        Ok(Self {
            config,
            db,
            characters: Arc::new(characters),
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route(
            "/characters",
            get(characters::list_characters)
                .post(characters::create_character)
                .put(characters::upsert_character)
                .delete(characters::delete_character),
        )
        .route("/characters/bulk", post(characters::create_characters))
        .route(
            "/characters/bulk/update",
            put(characters::upsert_characters),
        )
        .route(
            "/characters/bulk/delete",
            axum::routing::delete(characters::delete_characters),
        )
        .route(
            "/characters/{id}",
            get(characters::get_character).delete(characters::delete_character_by_id),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

/// Starts the server with the given configuration
pub async fn run_server(config: Arc<AppConfig>, state: AppState) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::characters::list_characters,
        crate::handlers::characters::get_character,
        crate::handlers::characters::create_character,
        crate::handlers::characters::create_characters,
        crate::handlers::characters::upsert_character,
        crate::handlers::characters::upsert_characters,
        crate::handlers::characters::delete_character_by_id,
        crate::handlers::characters::delete_character,
        crate::handlers::characters::delete_characters,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::character::Model,
            crate::models::character::CharacterDto,
            crate::handlers::HealthStatus,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "characters", description = "Character management"),
    ),
    info(
        title = "Holocron API",
        description = "CRUD, upsert and paging API for Star Wars characters",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
