//! Game API Routes
//!
//! One endpoint per player command. Each handler forwards to the matching
//! `GameController` command and returns the refreshed view.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prediction_game::{Direction, GameView, PredictionResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct StartGameRequest {
    pub ticker: String,
}

#[derive(Deserialize)]
pub struct PredictRequest {
    pub direction: String,
}

#[derive(Serialize)]
pub struct SettingsResponse {
    pub result_message_ms: u64,
}

pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(get_settings))
        .route("/api/game", get(get_game))
        .route("/api/game/start", post(start_game))
        .route("/api/game/predict", post(predict))
        .route("/api/game/reset", post(reset_game))
}

/// Client-side timings
async fn get_settings(State(state): State<AppState>) -> Json<ApiResponse<SettingsResponse>> {
    Json(ApiResponse::success(SettingsResponse {
        result_message_ms: state.config.result_message_ms,
    }))
}

/// Current game view, e.g. after a page reload
async fn get_game(State(state): State<AppState>) -> Json<ApiResponse<GameView>> {
    let game = state.game.lock().await;
    Json(ApiResponse::success(game.view()))
}

/// Fetch the ticker and start a new game
async fn start_game(
    State(state): State<AppState>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<ApiResponse<GameView>>, AppError> {
    // Only one start may be loading at a time
    let mut game = state.game.try_lock().map_err(|_| {
        AppError::new(
            StatusCode::CONFLICT,
            "A game is already loading. Please wait.",
        )
    })?;

    let mut rng = StdRng::from_entropy();
    let today = chrono::Local::now().date_naive();

    let view = game.on_start(&request.ticker, today, &mut rng).await?;

    Ok(Json(ApiResponse::success(view)))
}

/// Score an up/down guess and reveal the next day
async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<ApiResponse<PredictionResult>>, AppError> {
    let direction: Direction = request.direction.parse()?;

    let mut game = state.game.lock().await;
    let result = game.on_predict(direction)?;

    Ok(Json(ApiResponse::success(result)))
}

/// Discard the current game
async fn reset_game(State(state): State<AppState>) -> Json<ApiResponse<GameView>> {
    let mut game = state.game.lock().await;
    Json(ApiResponse::success(game.on_reset()))
}
