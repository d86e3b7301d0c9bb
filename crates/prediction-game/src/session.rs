//! Game Session State Machine
//!
//! Owns the fetched series and walks a cursor forward through a short window
//! around the start date, one prediction at a time.

use chrono::NaiveDate;
use market_data::DailyBar;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Trading days of history shown before the start date
pub const HISTORY_DAYS: usize = 7;
/// Records from the start date onward kept in the window (start included)
pub const FUTURE_DAYS: usize = 20;

/// Lifecycle of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// No game loaded
    Uninitialized,
    /// Waiting for the next prediction
    Active,
    /// Cursor is on the last record of the window
    Exhausted,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::Uninitialized => write!(f, "uninitialized"),
            GameState::Active => write!(f, "active"),
            GameState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// The player's guess for the next close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(GameError::InvalidDirection(s.to_string())),
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub direction: Direction,
    pub is_correct: bool,
    /// New close minus previous close
    pub actual_delta: f64,
    pub previous_close: f64,
    pub new_close: f64,
    /// Date of the newly revealed record
    pub date: NaiveDate,
}

/// A single game over one ticker's history.
///
/// The working window is always derived from `full_series` and
/// `window_start`; it is never stored separately.
#[derive(Debug, Clone)]
pub struct GameSession {
    ticker: String,
    full_series: Vec<DailyBar>,
    window_start: usize,
    cursor: usize,
    score: u32,
    predictions: u32,
    state: GameState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            full_series: Vec::new(),
            window_start: 0,
            cursor: 0,
            score: 0,
            predictions: 0,
            state: GameState::Uninitialized,
        }
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a series and place the cursor on `start_date`.
    ///
    /// Fails with `InsufficientHistory` unless `start_date` is in `series`
    /// with at least `HISTORY_DAYS` records before it. The session is left
    /// untouched on failure.
    pub fn initialize(
        &mut self,
        ticker: impl Into<String>,
        series: Vec<DailyBar>,
        start_date: NaiveDate,
    ) -> Result<(), GameError> {
        let start_index = series
            .iter()
            .position(|bar| bar.date == start_date)
            .filter(|&index| index >= HISTORY_DAYS)
            .ok_or(GameError::InsufficientHistory)?;

        *self = Self {
            ticker: ticker.into(),
            full_series: series,
            window_start: start_index - HISTORY_DAYS,
            cursor: HISTORY_DAYS,
            score: 0,
            predictions: 0,
            state: GameState::Active,
        };

        if !self.has_next() {
            self.state = GameState::Exhausted;
        }

        tracing::info!(
            ticker = %self.ticker,
            %start_date,
            window_len = self.window().len(),
            "Game initialized"
        );

        Ok(())
    }

    /// Reveal the next close and score the guess.
    ///
    /// Up is correct only on a strictly positive change; an unchanged close
    /// counts as Down.
    pub fn advance(&mut self, direction: Direction) -> Result<PredictionOutcome, GameError> {
        if self.state != GameState::Active {
            return Err(GameError::InvalidState { state: self.state });
        }

        let window = self.window();
        let (current, next) = match (window.get(self.cursor), window.get(self.cursor + 1)) {
            (Some(current), Some(next)) => (current, next),
            _ => return Err(GameError::InvalidState { state: self.state }),
        };

        let actual_delta = next.close - current.close;
        let is_correct = match direction {
            Direction::Up => actual_delta > 0.0,
            Direction::Down => actual_delta <= 0.0,
        };

        let outcome = PredictionOutcome {
            direction,
            is_correct,
            actual_delta,
            previous_close: current.close,
            new_close: next.close,
            date: next.date,
        };

        if is_correct {
            self.score += 1;
        }
        self.predictions += 1;
        self.cursor += 1;

        if !self.has_next() {
            self.state = GameState::Exhausted;
            tracing::info!(
                ticker = %self.ticker,
                score = self.score,
                predictions = self.predictions,
                "Game exhausted"
            );
        }

        Ok(outcome)
    }

    /// Drop the loaded game and return to `Uninitialized`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn predictions(&self) -> u32 {
        self.predictions
    }

    /// Index of "today" within the working window
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == GameState::Exhausted
    }

    /// Up to 7 days of history, the start date and up to 19 days after it
    pub fn window(&self) -> &[DailyBar] {
        if self.state == GameState::Uninitialized {
            return &[];
        }
        let start_index = self.window_start + HISTORY_DAYS;
        let end = (start_index + FUTURE_DAYS).min(self.full_series.len());
        &self.full_series[self.window_start..end]
    }

    /// The part of the window the player has seen so far
    pub fn visible(&self) -> &[DailyBar] {
        let window = self.window();
        if window.is_empty() {
            return window;
        }
        &window[..=self.cursor]
    }

    pub fn current(&self) -> Option<&DailyBar> {
        self.window().get(self.cursor)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.window().get(HISTORY_DAYS).map(|bar| bar.date)
    }

    fn has_next(&self) -> bool {
        self.cursor + 1 < self.window().len()
    }
}
