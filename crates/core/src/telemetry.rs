//! Engine power telemetry as reported by `GET /get-data`.
//!
//! The device answers with a flat JSON object keyed by engine index. Older
//! firmware counts engines from `"0"`, the bench server from `"1"`.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const ENGINE_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("telemetry body is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("telemetry is missing reading for engine key {0:?}")]
    MissingReading(String),
    #[error("telemetry reading for engine key {key:?} is not numeric: {value}")]
    NotNumeric { key: String, value: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBase {
    Zero,
    One,
}

impl KeyBase {
    fn key(self, slot: usize) -> String {
        match self {
            KeyBase::Zero => slot.to_string(),
            KeyBase::One => (slot + 1).to_string(),
        }
    }
}

/// Four engine power readings in engine order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub engines: [f64; ENGINE_COUNT],
}

impl TelemetrySnapshot {
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let record: HashMap<String, Value> = serde_json::from_slice(body)?;
        let base = if record.contains_key("0") { KeyBase::Zero } else { KeyBase::One };
        Self::from_record(&record, base)
    }

    pub fn from_record(record: &HashMap<String, Value>, base: KeyBase) -> Result<Self, DecodeError> {
        let mut engines = [0.0; ENGINE_COUNT];
        for (slot, reading) in engines.iter_mut().enumerate() {
            let key = base.key(slot);
            let value = record.get(&key).ok_or_else(|| DecodeError::MissingReading(key.clone()))?;
            *reading = numeric(value).ok_or_else(|| DecodeError::NotNumeric { key, value: value.clone() })?;
        }
        Ok(Self { engines })
    }

    /// Readings formatted for the display slots, two decimals each.
    pub fn rendered(&self) -> [String; ENGINE_COUNT] {
        self.engines.map(format_reading)
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.rendered();
        write!(f, "{} | {} | {} | {}", a, b, c, d)
    }
}

// Numbers, or strings holding a number (the bench server has sent both).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub fn format_reading(value: f64) -> String {
    format!("{:.2}", round_hundredths(value))
}

/// Rounds half away from zero on the shortest decimal form of `value`, so
/// `1.005` becomes `1.01` even though its binary value sits just below.
pub fn round_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let text = value.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend((0..2).map(|i| frac.get(i).copied().unwrap_or(b'0')));

    if frac.get(2).is_some_and(|d| *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let rounded = format!(
        "{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    );
    match rounded.parse::<f64>() {
        Ok(v) if v == 0.0 => 0.0,
        Ok(v) => v.copysign(value),
        Err(_) => value,
    }
}
