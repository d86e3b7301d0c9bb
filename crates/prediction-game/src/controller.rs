//! Command Handlers
//!
//! One handler per UI command, each mapped to a single session operation.

use chrono::NaiveDate;
use market_data::{DailySeriesSource, FetchError};
use rand::Rng;
use serde::Serialize;

use crate::error::GameError;
use crate::presentation::{outcome_message, GameView};
use crate::selector::select_start_date;
use crate::session::{Direction, GameSession, GameState, PredictionOutcome};

/// Response to a prediction command
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub outcome: PredictionOutcome,
    pub message: String,
    pub view: GameView,
}

/// Drives the one live game session from UI commands.
pub struct GameController<S> {
    source: S,
    session: GameSession,
}

impl<S: DailySeriesSource> GameController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            session: GameSession::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn view(&self) -> GameView {
        GameView::from_session(&self.session)
    }

    /// Fetch `ticker`, pick a start date and begin a new game.
    ///
    /// A game must be reset before another can start. On any failure the
    /// session stays uninitialized.
    pub async fn on_start<R: Rng + ?Sized>(
        &mut self,
        ticker: &str,
        reference_today: NaiveDate,
        rng: &mut R,
    ) -> Result<GameView, GameError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(GameError::EmptyTicker);
        }

        if self.session.state() != GameState::Uninitialized {
            return Err(GameError::InvalidState {
                state: self.session.state(),
            });
        }

        tracing::info!(ticker = %ticker, "Starting game");

        let series = self.source.fetch_daily(&ticker).await.map_err(|e| {
            tracing::warn!(ticker = %ticker, error = %e, "Fetch failed");
            e
        })?;

        if series.is_empty() {
            return Err(FetchError::EmptyResult(ticker).into());
        }

        let start_date = select_start_date(&series, reference_today, rng);
        self.session.initialize(ticker, series, start_date)?;

        Ok(self.view())
    }

    pub fn on_predict(&mut self, direction: Direction) -> Result<PredictionResult, GameError> {
        let outcome = self.session.advance(direction)?;

        tracing::debug!(
            ticker = %self.session.ticker(),
            %direction,
            correct = outcome.is_correct,
            delta = outcome.actual_delta,
            "Prediction scored"
        );

        Ok(PredictionResult {
            message: outcome_message(&outcome),
            outcome,
            view: self.view(),
        })
    }

    pub fn on_reset(&mut self) -> GameView {
        if self.session.state() != GameState::Uninitialized {
            tracing::info!(
                ticker = %self.session.ticker(),
                score = self.session.score(),
                "Game reset"
            );
        }
        self.session.reset();
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::tests::weekday_series;
    use crate::session::HISTORY_DAYS;
    use async_trait::async_trait;
    use market_data::DailyBar;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        result: Result<Vec<DailyBar>, FetchError>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn returning(result: Result<Vec<DailyBar>, FetchError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DailySeriesSource for StubSource {
        async fn fetch_daily(&self, _ticker: &str) -> Result<Vec<DailyBar>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 14)
    }

    fn healthy_controller() -> GameController<StubSource> {
        let series = weekday_series(date(2023, 6, 1), date(2024, 6, 13));
        GameController::new(StubSource::returning(Ok(series)))
    }

    #[tokio::test]
    async fn test_start_initializes_session() {
        let mut controller = healthy_controller();
        let mut rng = StdRng::seed_from_u64(7);

        let view = controller.on_start("  aapl ", today(), &mut rng).await.unwrap();

        assert_eq!(view.state, GameState::Active);
        assert_eq!(view.ticker, "AAPL");
        assert_eq!(view.score, 0);
        assert_eq!(view.chart.points.len(), HISTORY_DAYS + 1);
        assert!(view.can_predict);
        assert_eq!(controller.session().cursor(), HISTORY_DAYS);
    }

    #[tokio::test]
    async fn test_empty_ticker_is_rejected_without_fetch() {
        let mut controller = healthy_controller();
        let mut rng = StdRng::seed_from_u64(1);

        let result = controller.on_start("   ", today(), &mut rng).await;
        assert_eq!(result, Err(GameError::EmptyTicker));
        assert_eq!(controller.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_start_requires_reset() {
        let mut controller = healthy_controller();
        let mut rng = StdRng::seed_from_u64(2);

        controller.on_start("AAPL", today(), &mut rng).await.unwrap();
        let again = controller.on_start("MSFT", today(), &mut rng).await;
        assert!(matches!(
            again,
            Err(GameError::InvalidState {
                state: GameState::Active
            })
        ));
        assert_eq!(controller.session().ticker(), "AAPL");

        controller.on_reset();
        let view = controller.on_start("MSFT", today(), &mut rng).await.unwrap();
        assert_eq!(view.ticker, "MSFT");
        assert_eq!(view.score, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_surfaced() {
        let source = StubSource::returning(Err(FetchError::RateLimited("slow down".to_string())));
        let mut controller = GameController::new(source);
        let mut rng = StdRng::seed_from_u64(3);

        let result = controller.on_start("IBM", today(), &mut rng).await;
        assert!(matches!(
            result,
            Err(GameError::Fetch(FetchError::RateLimited(_)))
        ));
        assert_eq!(controller.session().state(), GameState::Uninitialized);
    }

    #[tokio::test]
    async fn test_empty_series_is_empty_result() {
        let mut controller = GameController::new(StubSource::returning(Ok(Vec::new())));
        let mut rng = StdRng::seed_from_u64(4);

        let result = controller.on_start("IBM", today(), &mut rng).await;
        assert_eq!(
            result,
            Err(GameError::Fetch(FetchError::EmptyResult("IBM".to_string())))
        );
    }

    #[tokio::test]
    async fn test_stale_series_is_insufficient_history() {
        // Data ends long before the selectable range, so the 30-day fallback misses
        let series = weekday_series(date(2020, 1, 1), date(2020, 3, 31));
        let mut controller = GameController::new(StubSource::returning(Ok(series)));
        let mut rng = StdRng::seed_from_u64(5);

        let result = controller.on_start("OLD", today(), &mut rng).await;
        assert_eq!(result, Err(GameError::InsufficientHistory));
        assert_eq!(controller.session().state(), GameState::Uninitialized);
    }

    #[tokio::test]
    async fn test_predict_and_reset_flow() {
        let mut controller = healthy_controller();
        let mut rng = StdRng::seed_from_u64(6);
        controller.on_start("AAPL", today(), &mut rng).await.unwrap();

        // Closes rise every day in the stub series
        let result = controller.on_predict(Direction::Up).unwrap();
        assert!(result.outcome.is_correct);
        assert!(result.message.starts_with("Correct! The price went UP by +$0.50"));
        assert_eq!(result.view.score, 1);
        assert_eq!(result.view.chart.points.len(), HISTORY_DAYS + 2);

        let view = controller.on_reset();
        assert_eq!(view.state, GameState::Uninitialized);
        assert!(matches!(
            controller.on_predict(Direction::Down),
            Err(GameError::InvalidState { .. })
        ));
    }
}
