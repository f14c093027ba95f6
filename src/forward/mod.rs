//! Forwarding of translated batches to the downstream store.

pub mod influx_sink;
pub mod line_protocol;

pub use influx_sink::{InfluxSink, SinkConfig, WriteSink};
