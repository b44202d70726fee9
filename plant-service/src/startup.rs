//! Application startup and lifecycle management.

use crate::config::PlantConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use crate::services::PlantDb;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PlantConfig,
    pub db: PlantDb,
    pub llm: Arc<dyn TextProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: PlantDb,
}

impl Application {
    /// Build the application with the configuration-selected provider.
    pub async fn build(config: PlantConfig) -> Result<Self, AppError> {
        let llm: Arc<dyn TextProvider> = match config.models.provider.as_str() {
            "mock" => Arc::new(MockTextProvider::new()),
            _ => Arc::new(GeminiTextProvider::new(GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.models.text_model.clone(),
            })),
        };

        tracing::info!(
            provider = %config.models.provider,
            model = %config.models.text_model,
            "Initialized text provider"
        );

        Self::build_with_provider(config, llm).await
    }

    /// Build the application with an explicit provider (tests inject scripted
    /// mocks through this).
    pub async fn build_with_provider(
        config: PlantConfig,
        llm: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let db = PlantDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            llm,
        };

        let api = Router::new()
            .route("/", get(handlers::root))
            .route("/predict", post(handlers::predict))
            .route("/predictions", get(handlers::list_predictions))
            .route("/chat", post(handlers::chat))
            .route("/chat/history/:session_id", get(handlers::chat_history));

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .nest("/api", api)
            .layer(from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.security.allowed_origins))
            .with_state(state);

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &PlantDb {
        &self.db
    }

    /// Run the application until stopped or signalled.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        cors.allow_origin(
            allowed_origins
                .iter()
                .filter_map(|o| {
                    o.parse::<HeaderValue>()
                        .map_err(|e| {
                            tracing::error!("Invalid CORS origin '{}': {}", o, e);
                            e
                        })
                        .ok()
                })
                .collect::<Vec<HeaderValue>>(),
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
