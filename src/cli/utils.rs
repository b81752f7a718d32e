use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "message": message });
            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a raw value as JSON, or fall back to the given text renderer
pub fn output_value<F>(output_format: OutputFormat, value: &Value, render_text: F) -> anyhow::Result<()>
where
    F: FnOnce(&Value),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render_text(value),
    }
    Ok(())
}

/// Text rendering of one assembled alert
pub fn format_alert(alert: &Value) -> String {
    let field = |name: &str| alert.get(name).map(display_value).unwrap_or_default();

    let mut out = format!(
        "{}  [{}] {}\n  sid: {}  at: {}",
        field("_id"),
        field("code"),
        field("alert_message"),
        field("sid"),
        field("timestamp"),
    );

    let transactions = alert
        .get("transactions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if transactions.is_empty() {
        out.push_str("\n  (no transactions)");
    }
    for tx in transactions {
        let tx_field = |name: &str| tx.get(name).map(display_value).unwrap_or_default();
        out.push_str(&format!(
            "\n  - {} growth {}% ({})",
            tx_field("system_name"),
            tx_field("growth"),
            tx_field("file_path"),
        ));
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_alert_with_transactions() {
        let alert = json!({
            "_id": "a1",
            "alert_message": "Spike",
            "timestamp": "2024-01-01",
            "sid": "S1",
            "code": "C1",
            "transactions": [
                {"system_name": "ledger", "growth": 12.5, "file_path": "/x.csv"}
            ]
        });

        let text = format_alert(&alert);
        assert!(text.starts_with("a1  [C1] Spike"));
        assert!(text.contains("- ledger growth 12.5% (/x.csv)"));
    }

    #[test]
    fn formats_alert_without_transactions() {
        let text = format_alert(&json!({"_id": "a2", "transactions": []}));
        assert!(text.contains("(no transactions)"));
    }
}
