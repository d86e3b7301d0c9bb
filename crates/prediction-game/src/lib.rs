//! Prediction Game
//!
//! Walk-forward up/down guessing over a stock's recent daily closes.
//! A random start date is chosen from the fetched history, the player sees
//! the week leading up to it, then predicts each next close one day at a time.

pub mod controller;
pub mod error;
pub mod presentation;
pub mod selector;
pub mod session;

pub use controller::{GameController, PredictionResult};
pub use error::GameError;
pub use presentation::{
    format_display_date, format_price, outcome_message, render_chart, ChartPoint, ChartSeries,
    ChartSink, GameView,
};
pub use selector::select_start_date;
pub use session::{Direction, GameSession, GameState, PredictionOutcome};
