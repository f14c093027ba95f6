//! HTTP module for the relay
//!
//! Provides the legacy write endpoint:
//! - `POST /db/graphite/series`

pub mod server;

pub use server::{create_router, start_server, ApiError, AppState, WriteParams};
