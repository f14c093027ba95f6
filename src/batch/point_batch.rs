//! Request-scoped accumulation of translated points.
//!
//! Each handler invocation owns its own batch, so no synchronization is
//! needed and points from concurrent requests can never mix. The batch
//! is drained for every forward attempt, success or failure, which keeps
//! it empty once a forward cycle completes.

use crate::translate::TranslatedPoint;

/// Downstream precision label the relay writes with (microseconds).
pub const BATCH_PRECISION: &str = "u";

/// Ordered collection of points bound for one downstream write.
#[derive(Debug)]
pub struct PointBatch {
    database: String,
    precision: &'static str,
    points: Vec<TranslatedPoint>,
}

impl PointBatch {
    /// Create an empty batch targeting the given database.
    pub fn new(database: impl Into<String>) -> Self {
        PointBatch { database: database.into(), precision: BATCH_PRECISION, points: Vec::new() }
    }

    /// Append a translated point. O(1), never fails.
    pub fn append(&mut self, point: TranslatedPoint) {
        self.points.push(point);
    }

    /// Take the accumulated points, leaving the batch empty.
    pub fn drain(&mut self) -> Vec<TranslatedPoint> {
        std::mem::take(&mut self.points)
    }

    /// Target database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Precision label for the downstream write.
    pub fn precision(&self) -> &'static str {
        self.precision
    }

    /// Points accumulated so far.
    pub fn points(&self) -> &[TranslatedPoint] {
        &self.points
    }

    /// Number of accumulated points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the batch holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
