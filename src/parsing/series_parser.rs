//! Decoder for the legacy series write format.
//!
//! The body of a legacy write is a JSON array of named series, each with
//! an ordered column list and a matrix of row values:
//!
//! ```json
//! [{"name": "host.cpu.load", "columns": ["time", "value"], "points": [[1000, 0.5]]}]
//! ```
//!
//! Decoding is purely structural. Row/column shape checks belong to the
//! translator, which sees one series at a time.

use crate::error::Result;
use serde::Deserialize;

/// One named series as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingSeries {
    /// Dot-delimited series name, e.g. `host.cpu.load`.
    pub name: String,
    /// Ordered field names, unique within the series.
    pub columns: Vec<String>,
    /// Row-oriented values; each row pairs positionally with `columns`.
    pub points: Vec<Vec<f64>>,
}

/// Decode a request body into a sequence of series.
///
/// An empty array is valid and yields no series. Any structural failure
/// (truncated JSON, wrong types) surfaces as [`crate::Error::Decode`].
pub fn decode_series(body: &[u8]) -> Result<Vec<IncomingSeries>> {
    let series = serde_json::from_slice(body)?;
    Ok(series)
}
