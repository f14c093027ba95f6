//! Point batching for downstream writes.

pub mod point_batch;

pub use point_batch::{PointBatch, BATCH_PRECISION};
