use serde_json::Value;

/// Headline answers, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "verdict",
    "price",
    "required_sales",
    "net_worth",
    "severity",
    "changes",
    "break_even_sales",
    "enterprise_value",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in &PRIORITY_KEYS {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        // Scenario comparisons: one "name: price" line per row
        Value::Array(rows) => {
            for row in rows {
                if let (Some(name), Some(price)) = (row.get("name"), row.get("price")) {
                    println!("{}: {}", format_minimal(name), format_minimal(price));
                }
            }
            return;
        }
        _ => {}
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // A verdict prints as its code
        Value::Object(map) if map.contains_key("code") => format_minimal(&map["code"]),
        Value::Object(map) if map.contains_key("ebitda_trend") => {
            format!(
                "revenue {} / ebitda {} / cash cycle {}",
                format_minimal(&map["revenue_trend"]),
                format_minimal(&map["ebitda_trend"]),
                format_minimal(&map["ccc_trend"]),
            )
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
