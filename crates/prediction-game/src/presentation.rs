//! Presentation Adapter
//!
//! Turns session state into the chart series and display strings a UI shows.
//! Holds no state of its own.

use chrono::NaiveDate;
use serde::Serialize;

use crate::session::{GameSession, GameState, PredictionOutcome};

pub const COMPLETED_MESSAGE: &str = "Game completed! No more data available.";

/// A single labelled value on the price chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Receives the full ordered series on every redraw.
pub trait ChartSink {
    fn redraw(&mut self, series_label: &str, points: &[ChartPoint]);
}

/// Sink that keeps the last drawn series, for serializing to a client
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSink for ChartSeries {
    fn redraw(&mut self, series_label: &str, points: &[ChartPoint]) {
        self.label = series_label.to_string();
        self.points = points.to_vec();
    }
}

/// Redraw `sink` with every close up to and including today.
pub fn render_chart<S: ChartSink + ?Sized>(session: &GameSession, sink: &mut S) {
    let points: Vec<ChartPoint> = session
        .visible()
        .iter()
        .map(|bar| ChartPoint {
            label: format_display_date(bar.date),
            value: bar.close,
        })
        .collect();

    sink.redraw(&format!("{} Price", session.ticker()), &points);
}

/// Everything a UI needs to draw the game after a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub state: GameState,
    pub ticker: String,
    pub score: u32,
    pub predictions: u32,
    pub current_date: Option<String>,
    pub current_price: Option<String>,
    pub chart: ChartSeries,
    pub can_predict: bool,
    pub message: Option<String>,
}

impl GameView {
    pub fn from_session(session: &GameSession) -> Self {
        let current = session.current();

        let mut chart = ChartSeries::default();
        if session.state() != GameState::Uninitialized {
            render_chart(session, &mut chart);
        }

        Self {
            state: session.state(),
            ticker: session.ticker().to_string(),
            score: session.score(),
            predictions: session.predictions(),
            current_date: current.map(|bar| format_display_date(bar.date)),
            current_price: current.map(|bar| format_price(bar.close)),
            chart,
            can_predict: session.state() == GameState::Active,
            message: session
                .is_exhausted()
                .then(|| COMPLETED_MESSAGE.to_string()),
        }
    }
}

/// "Jan 11, 2023"
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Player-facing result line for a prediction.
pub fn outcome_message(outcome: &PredictionOutcome) -> String {
    let verdict = if outcome.is_correct { "Correct!" } else { "Wrong!" };
    let (movement, change) = if outcome.actual_delta > 0.0 {
        ("UP", format!("+${:.2}", outcome.actual_delta))
    } else {
        ("DOWN", format!("-${:.2}", outcome.actual_delta.abs()))
    };

    format!(
        "{} The price went {} by {} to {}",
        verdict,
        movement,
        change,
        format_price(outcome.new_close)
    )
}
