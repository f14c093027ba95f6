//! Series-to-point translation.

pub mod point_translator;

pub use point_translator::{derive_tags, translate_series, TimePrecision, TranslatedPoint};
