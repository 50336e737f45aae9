use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_scalar;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render_table(value));
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => render_envelope(result, map),
            _ => field_table(map),
        },
        _ => format_value(value),
    }
}

fn render_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) -> String {
    let mut out = field_table(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\n\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("\n  - {}", w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\n\nMethodology: {}", meth));
    }

    out
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    Table::from(builder).to_string()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        _ => format_scalar(value, "null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_table_includes_fields_and_warnings() {
        let out = json!({
            "result": {"var": "5000.00", "quantile_index": 0},
            "methodology": "Historical Simulation VaR",
            "warnings": ["Sample of 5 returns is small"]
        });
        let rendered = render_table(&out);
        assert!(rendered.contains("var"));
        assert!(rendered.contains("5000.00"));
        assert!(rendered.contains("Warnings:\n  - Sample of 5 returns is small"));
        assert!(rendered.ends_with("Methodology: Historical Simulation VaR"));
    }

    #[test]
    fn test_arrays_join_inline() {
        assert_eq!(format_value(&json!(["a", 1, null])), "a, 1, null");
    }
}
