//! Translation of legacy series rows into tagged measurement points.
//!
//! Each series name is split on `.`: the first segment becomes the
//! measurement, and the full name plus every segment become tags
//! (`name`, `tag0`, `tag1`, ...). Each row is zipped against the column
//! list to form the field set; a `time` column, when present, is
//! consumed for timestamp resolution and removed from the fields.

use crate::{
    batch::PointBatch,
    error::{Error, Result},
    parsing::IncomingSeries,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::info;

/// Unit an incoming numeric time value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    /// Whole seconds since the epoch.
    Seconds,
    /// Milliseconds since the epoch.
    Milliseconds,
    /// Microseconds since the epoch.
    Microseconds,
}

impl TimePrecision {
    /// Parse the `time_precision` request parameter. Anything other than
    /// `s`, `ms` or `us` is treated as no selection.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "s" => Some(TimePrecision::Seconds),
            "ms" => Some(TimePrecision::Milliseconds),
            "us" => Some(TimePrecision::Microseconds),
            _ => None,
        }
    }
}

/// One translated point, ready for batching.
///
/// Constructed once per row and never mutated afterwards. Tag and field
/// maps are ordered so downstream encoding is deterministic.
#[derive(Debug, Clone)]
pub struct TranslatedPoint {
    /// First dot-segment of the series name.
    pub measurement: String,
    /// `name` plus one `tagN` entry per dot-segment.
    pub tags: BTreeMap<String, String>,
    /// Column/value pairs, minus any consumed `time` entry.
    pub fields: BTreeMap<String, f64>,
    /// Resolved instant for the row.
    pub timestamp: DateTime<Utc>,
}

/// Derive the tag set for a series name.
///
/// `tags("host.cpu.load")` yields `{name: "host.cpu.load", tag0: "host",
/// tag1: "cpu", tag2: "load"}`. Pure function of the name.
pub fn derive_tags(name: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("name".to_string(), name.to_string());
    for (index, segment) in name.split('.').enumerate() {
        tags.insert(format!("tag{}", index), segment.to_string());
    }
    tags
}

/// Translate every row of a series and append the points to `batch`.
///
/// Fails closed on the first bad row: a row whose length does not match
/// the column count is a [`Error::RowShape`], an unusable time value is
/// a [`Error::TimeParse`], and a row with no fields left after the time
/// column is consumed is a [`Error::EmptyRow`].
pub fn translate_series(
    series: &IncomingSeries,
    precision: Option<TimePrecision>,
    batch: &mut PointBatch,
) -> Result<()> {
    let measurement = series.name.split('.').next().unwrap_or_default().to_string();
    let tags = derive_tags(&series.name);

    for (row_index, row) in series.points.iter().enumerate() {
        if row.len() != series.columns.len() {
            return Err(Error::RowShape {
                series: series.name.clone(),
                row: row_index,
                got: row.len(),
                expected: series.columns.len(),
            });
        }

        let mut fields: BTreeMap<String, f64> =
            series.columns.iter().cloned().zip(row.iter().copied()).collect();

        let timestamp = match fields.remove("time") {
            Some(value) => resolve_timestamp(&series.name, value, precision)?,
            None => {
                info!(series = %series.name, "no time column, using local time");
                Utc::now()
            }
        };

        if fields.is_empty() {
            return Err(Error::EmptyRow { series: series.name.clone(), row: row_index });
        }

        batch.append(TranslatedPoint {
            measurement: measurement.clone(),
            tags: tags.clone(),
            fields,
            timestamp,
        });
    }

    Ok(())
}

/// Resolve a numeric time value against the selected precision.
///
/// With no recognized precision the value is ignored and the current
/// wall-clock time is used, matching the legacy behaviour. For `ms` and
/// `us` the value decomposes into whole seconds and a sub-second
/// remainder by floor division, so negative and non-multiple values land
/// on the correct instant.
fn resolve_timestamp(
    series: &str,
    value: f64,
    precision: Option<TimePrecision>,
) -> Result<DateTime<Utc>> {
    let Some(precision) = precision else {
        info!(series, "no recognized time precision, using local time");
        return Ok(Utc::now());
    };

    let ticks = integral_ticks(series, value)?;
    let (seconds, nanos) = match precision {
        TimePrecision::Seconds => (ticks, 0),
        TimePrecision::Milliseconds => {
            (ticks.div_euclid(1_000), ticks.rem_euclid(1_000) as u32 * 1_000_000)
        }
        TimePrecision::Microseconds => {
            (ticks.div_euclid(1_000_000), ticks.rem_euclid(1_000_000) as u32 * 1_000)
        }
    };

    Utc.timestamp_opt(seconds, nanos)
        .single()
        .ok_or_else(|| Error::TimeParse { series: series.to_string(), value })
}

/// A time value must be a finite integer count of units.
fn integral_ticks(series: &str, value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::TimeParse { series: series.to_string(), value });
    }
    Ok(value as i64)
}
