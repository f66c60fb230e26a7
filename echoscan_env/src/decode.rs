//! Sensor line decoding.
//!
//! Accepted shapes, tried in order:
//! 1. A JSON object: `{"dist_cm": 42, "heading_deg": 90, "state": "DRIVE"}`.
//!    Short keys `d` and `s` are accepted too.
//! 2. Any line containing `dist_cm` followed by separators (`"`, `:`,
//!    whitespace) and digits, with an optional `state` token decoded the
//!    same way.
//!
//! Negative headings mean "no heading". Range validation is left to the
//! core.

use crate::error::EnvError;
use crate::types::RawReading;
use serde::Deserialize;

/// JSON line as sent by the firmware.
#[derive(Debug, Deserialize)]
struct WireReading {
    #[serde(alias = "d")]
    dist_cm: Option<f64>,

    #[serde(alias = "heading")]
    heading_deg: Option<f64>,

    #[serde(alias = "s")]
    state: Option<String>,
}

/// Decodes one line into a reading.
pub fn decode_line(line: &str) -> Result<RawReading, EnvError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(EnvError::decode("empty line"));
    }

    if line.starts_with('{') {
        if let Ok(wire) = serde_json::from_str::<WireReading>(line) {
            let distance_cm = wire
                .dist_cm
                .ok_or_else(|| EnvError::decode("JSON line has no dist_cm"))?;
            return Ok(RawReading {
                distance_cm,
                heading_deg: wire.heading_deg.filter(|h| *h >= 0.0),
                state: wire.state.filter(|s| !s.is_empty()),
            });
        }
    }

    let distance_cm = scan_value(line, "dist_cm", |c| c.is_ascii_digit())
        .and_then(|digits| digits.parse::<f64>().ok())
        .ok_or_else(|| EnvError::decode(format!("no dist_cm in line: {}", line)))?;
    let reading = RawReading::new(distance_cm);
    Ok(match scan_value(line, "state", |c| c.is_alphanumeric() || c == '_') {
        Some(state) => reading.with_state(state),
        None => reading,
    })
}

/// Finds `key`, skips `"`/`:`/whitespace, and returns the run of
/// characters accepted by `accept`.
fn scan_value<'a>(line: &'a str, key: &str, accept: impl Fn(char) -> bool) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let value_start = rest
        .char_indices()
        .find(|(_, c)| !(*c == '"' || *c == ':' || c.is_whitespace()))
        .map(|(i, _)| i)?;
    // At least one separator is required
    if value_start == 0 {
        return None;
    }
    let value = &rest[value_start..];
    let end = value
        .char_indices()
        .find(|(_, c)| !accept(*c))
        .map_or(value.len(), |(i, _)| i);
    if end == 0 {
        None
    } else {
        Some(&value[..end])
    }
}
