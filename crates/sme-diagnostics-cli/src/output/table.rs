use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Array(rows) => print_array_table(rows),
        Value::Object(res_map) if res_map.contains_key("classifications") => {
            print_diagnosis(res_map)
        }
        Value::Object(res_map) if res_map.contains_key("period_results") => {
            print_trend(res_map)
        }
        Value::Object(_) => print_flat_object(result),
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Summary page of a full diagnosis: verdict, metrics, alerts, advice, bridge.
fn print_diagnosis(diagnosis: &Map<String, Value>) {
    let field = |key: &str| diagnosis.get(key).map(format_value).unwrap_or_default();

    println!("{} ({})", field("company_name").bold(), field("as_of"));
    if let Some(Value::Object(verdict)) = diagnosis.get("verdict") {
        let message = verdict.get("message").map(format_value).unwrap_or_default();
        let line = match verdict.get("code").and_then(Value::as_str) {
            Some("healthy") => message.green(),
            Some("real_estate_risk") => message.yellow(),
            _ => message.red(),
        };
        println!("{}", line.bold());
    }
    println!(
        "Operating: {}  Liquidity: {}  Worst alert: {}\n",
        field("operating_status"),
        field("liquidity_status"),
        field("overall_severity"),
    );

    if let Some(metrics) = diagnosis.get("metrics") {
        print_flat_object(metrics);
    }
    if let Some(Value::Array(alerts)) = diagnosis.get("classifications") {
        println!();
        print_array_table(alerts);
    }
    if let Some(Value::Array(recs)) = diagnosis.get("recommendations") {
        if !recs.is_empty() {
            println!("\nRecommendations:");
            for r in recs {
                println!("  - {}", format_value(r));
            }
        }
    }
    if let Some(Value::Array(steps)) = diagnosis.get("waterfall") {
        println!();
        print_array_table(steps);
    }
}

/// One row per period with the headline figures, then the comparison.
fn print_trend(trend: &Map<String, Value>) {
    const COLUMNS: [&str; 6] = [
        "ebitda",
        "ebitda_margin_pct",
        "net_income",
        "cash_conversion_cycle",
        "margin_of_safety_pct",
        "acid_test_ratio",
    ];

    if let Some(Value::Array(rows)) = trend.get("period_results") {
        let mut builder = Builder::default();
        let mut header = vec!["period".to_string()];
        header.extend(COLUMNS.iter().map(|c| c.to_string()));
        header.push("verdict".to_string());
        builder.push_record(header);

        for row in rows {
            let mut record = vec![row.get("period").map(format_value).unwrap_or_default()];
            for col in COLUMNS {
                record.push(
                    row.get("metrics")
                        .and_then(|m| m.get(col))
                        .map(format_value)
                        .unwrap_or_default(),
                );
            }
            record.push(row.get("verdict").map(format_value).unwrap_or_default());
            builder.push_record(record);
        }
        println!("{}", Table::from(builder));
    }

    for key in ["changes", "averages"] {
        if let Some(section) = trend.get(key) {
            println!("\n{}:", key);
            print_flat_object(section);
        }
    }
    if let Some(Value::Array(losses)) = trend.get("loss_making_periods") {
        if !losses.is_empty() {
            let labels: Vec<String> = losses.iter().map(format_value).collect();
            println!("\n{} {}", "Loss-making periods:".red(), labels.join(", "));
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
