use serde_json::Value;

use super::{format_scalar, result_of};

/// Print just the VaR figure(s) from the output.
///
/// Single-method results print the loss amount. A summary prints one
/// `<label>: <value>` line per method.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result_obj = result_of(value);

    let Value::Object(map) = result_obj else {
        return vec![format_scalar(result_obj, "null")];
    };

    if let Some(var) = map.get("var").filter(|v| !v.is_null()) {
        return vec![format_scalar(var, "null")];
    }

    let labeled: Vec<String> = map
        .iter()
        .filter(|(key, _)| key.ends_with(" VaR"))
        .map(|(key, val)| format!("{}: {}", key, format_scalar(val, "null")))
        .collect();
    if !labeled.is_empty() {
        return labeled;
    }

    // Fall back to first field
    map.iter()
        .next()
        .map(|(key, val)| vec![format!("{}: {}", key, format_scalar(val, "null"))])
        .unwrap_or_default()
}
