use serde_json::Value;

/// Normalize a stored growth value to a float. Never fails.
///
/// Text is read as a number once every `%` is removed; anything that does not
/// parse to a finite value, and any absent or zero value, becomes `0.0`.
pub fn parse_growth(raw: &Value) -> f64 {
    match raw {
        Value::String(text) => parse_percent(text).unwrap_or(0.0),
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn parse_percent(text: &str) -> Option<f64> {
    let number = text.replace('%', "");
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
