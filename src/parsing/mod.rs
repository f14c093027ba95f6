//! Parsing of the legacy wire format.

pub mod series_parser;

pub use series_parser::{decode_series, IncomingSeries};
