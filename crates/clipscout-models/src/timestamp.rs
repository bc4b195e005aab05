//! Timestamp parsing and formatting helpers.
//!
//! The export format uses `HH:MM:SS.mmm` strings; internally everything is
//! seconds as `f64`.

use crate::error::{ConfigError, ConfigResult};

/// Parse a timestamp string (HH:MM:SS(.mmm), MM:SS(.mmm), or SS(.mmm)) to total seconds.
pub fn parse_timestamp(ts: &str) -> ConfigResult<f64> {
    let parts: Vec<&str> = ts.split(':').collect();
    let parse = |s: &str| -> ConfigResult<f64> {
        s.parse::<f64>()
            .map_err(|_| ConfigError::invalid_timestamp(ts))
    };
    match parts.len() {
        1 => parse(parts[0]),
        2 => Ok(parse(parts[0])? * 60.0 + parse(parts[1])?),
        3 => Ok(parse(parts[0])? * 3600.0 + parse(parts[1])? * 60.0 + parse(parts[2])?),
        _ => Err(ConfigError::invalid_timestamp(ts)),
    }
}

/// Format seconds as an HH:MM:SS.mmm timestamp.
///
/// Rounds to whole milliseconds first so the carry propagates into the
/// seconds/minutes/hours fields and the output stays canonical (never a
/// `60.000` seconds field).
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let minutes = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}
