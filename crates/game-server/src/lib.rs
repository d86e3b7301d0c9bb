//! Game Server
//!
//! HTTP front for the prediction game: JSON command endpoints, the embedded
//! browser frontend, configuration and request tracing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use market_data::{AlphaVantageClient, DailySeriesSource, FetchError};
use prediction_game::{GameController, GameError};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod embedded_frontend;
pub mod game_routes;
pub mod request_id;
pub mod security_headers;

pub use config::ServerConfig;

/// The single live game, driven by whichever source the server was built with
pub type SharedGame = Arc<Mutex<GameController<Arc<dyn DailySeriesSource>>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub game: SharedGame,
}

impl AppState {
    pub fn new(config: ServerConfig, source: Arc<dyn DailySeriesSource>) -> Self {
        Self {
            config: Arc::new(config),
            game: Arc::new(Mutex::new(GameController::new(source))),
        }
    }
}

/// Envelope for every JSON response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// An error surfaced to the client with its status and display message
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        let status = match &err {
            GameError::EmptyTicker | GameError::InvalidDirection(_) => StatusCode::BAD_REQUEST,
            GameError::InsufficientHistory => StatusCode::UNPROCESSABLE_ENTITY,
            GameError::InvalidState { .. } => StatusCode::CONFLICT,
            GameError::Fetch(FetchError::InvalidTicker(_))
            | GameError::Fetch(FetchError::EmptyResult(_)) => StatusCode::NOT_FOUND,
            GameError::Fetch(FetchError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            GameError::Fetch(FetchError::Network(_))
            | GameError::Fetch(FetchError::ProviderNotice(_)) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(game_routes::game_routes())
        .fallback(embedded_frontend::static_handler)
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "game_server=info,prediction_game=info,market_data=info,tower_http=info",
            )
        })
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let config = ServerConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Alpha Vantage: {} (key {})", config.alpha_vantage_base_url, config.masked_api_key());
    tracing::info!("  HTTP timeout: {}s", config.http_timeout_seconds);
    tracing::info!("  Result message: {}ms", config.result_message_ms);

    let client = AlphaVantageClient::with_options(
        config.alpha_vantage_api_key.clone(),
        config.alpha_vantage_base_url.clone(),
        Duration::from_secs(config.http_timeout_seconds),
    );

    let addr = config.listen_addr();
    let state = AppState::new(config, Arc::new(client));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Stock prediction game listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
