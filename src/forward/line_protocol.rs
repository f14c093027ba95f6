//! Line protocol encoding for downstream writes.
//!
//! Format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Timestamps are rendered in microseconds, matching the precision label
//! the relay writes batches with. Tags are iterated in key order so the
//! output is canonical.

use crate::translate::TranslatedPoint;

/// Encode a single point as one line.
pub fn encode_point(point: &TranslatedPoint) -> String {
    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&escape_tag(value));
    }

    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&value.to_string());
    }

    line.push(' ');
    line.push_str(&point.timestamp.timestamp_micros().to_string());
    line
}

/// Encode a drained batch as a newline-separated write body.
pub fn encode_points(points: &[TranslatedPoint]) -> String {
    points.iter().map(encode_point).collect::<Vec<_>>().join("\n")
}

/// Spaces and commas in a measurement must be escaped with a backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Commas, equals signs and spaces in tag keys, tag values and field
/// keys must be escaped.
fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
