//! Error types for the relay pipeline.

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the relay
#[derive(Debug, Error)]
pub enum Error {
    /// The request body could not be decoded as a legacy series list
    #[error("body decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller credentials were missing or did not match
    #[error("username/password mismatch")]
    Auth,

    /// A row's value count does not match the series column count
    #[error("series '{series}': row {row} has {got} values for {expected} columns")]
    RowShape {
        series: String,
        row: usize,
        got: usize,
        expected: usize,
    },

    /// A time value is not an integer count of the selected unit
    #[error("series '{series}': time value {value} is not a valid timestamp")]
    TimeParse { series: String, value: f64 },

    /// A row has no fields left once the time column is consumed
    #[error("series '{series}': row {row} has no fields besides time")]
    EmptyRow { series: String, row: usize },

    /// The downstream write call failed
    #[error("downstream write error: {0}")]
    Forward(#[from] reqwest::Error),
}
