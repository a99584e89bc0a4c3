//! Coercion of loosely-typed property values.

use serde_json::{Map, Value};

/// Property names checked, in priority order, for a feature's value.
pub const VALUE_FIELDS: [&str; 4] = ["value", "VALUE", "Val", "val"];

/// Coerce a raw property value into a finite number.
///
/// Strings are trimmed and stripped of thousands separators and percent
/// signs before parsing. Anything that does not yield a finite number is
/// `None`; this never fails.
pub fn coerce_number(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '%').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Find the first non-null value property in priority order.
pub fn raw_value(properties: &Map<String, Value>) -> Option<&Value> {
    VALUE_FIELDS
        .iter()
        .filter_map(|key| properties.get(*key))
        .find(|v| !v.is_null())
}

/// String form of an identifier property.
///
/// Integral numbers print without a fractional part so that a GEOID stored
/// as `6075010100` or `6075010100.0` reads the same as its string form.
/// Missing, null, `false` and zero read as the empty string.
pub fn id_string(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                if i == 0 {
                    return String::new();
                }
                return i.to_string();
            }
            if let Some(u) = n.as_u64() {
                return u.to_string();
            }
            match n.as_f64() {
                Some(f) if f == 0.0 => String::new(),
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
                Some(f) => f.to_string(),
                None => n.to_string(),
            }
        }
        Some(other) => other.to_string(),
    }
}
