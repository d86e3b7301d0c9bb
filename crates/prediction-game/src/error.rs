use market_data::FetchError;
use thiserror::Error;

use crate::session::GameState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Please enter a stock ticker symbol.")]
    EmptyTicker,

    #[error("Insufficient historical data for this ticker. Please try another.")]
    InsufficientHistory,

    #[error("Operation not allowed while the game is {state}")]
    InvalidState { state: GameState },

    #[error("Invalid prediction direction: {0}")]
    InvalidDirection(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
