//! Numeric coercion for configuration values
//!
//! Experiment documents write step budgets and learning rates in several
//! lexical forms: plain integers, floats, scientific notation (`1.1e7`)
//! and underscore-grouped integers (`1_000_000`). The YAML parser hands
//! the underscore form back as a string, so any code reading a numeric
//! parameter goes through these coercions instead of `Value::as_u64`.

use serde_yaml::Value;

/// Read a value as a float, accepting every numeric lexical form
/// the document format permits.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_grouped(s),
        _ => None,
    }
}

/// Read a value as an unsigned integer.
///
/// Scientific notation is accepted when the value is integral
/// (`1.1e7` is a valid step budget).
pub fn as_u64(value: &Value) -> Option<u64> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_u64() {
            return Some(i);
        }
    }
    let f = as_f64(value)?;
    if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

pub fn as_usize(value: &Value) -> Option<usize> {
    as_u64(value).and_then(|v| usize::try_from(v).ok())
}

/// Parse a string numeral, stripping digit-group underscores first.
fn parse_grouped(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // Underscores are only a digit separator, never leading or trailing.
    if s.starts_with('_') || s.ends_with('_') {
        return None;
    }
    let stripped: String = s.chars().filter(|c| *c != '_').collect();
    stripped.parse::<f64>().ok()
}
