use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, row_field};

/// Format output as tables: summary fields first, then installment rows.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => println!("{}", field_table(map)),
        },
        Value::Array(arr) => println!("{}", row_table(arr)),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    println!("{}", field_table(result));

    if let Some((name, rows)) = row_field(result) {
        println!("\n{}:", name);
        println!("{}", row_table(rows));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Two-column table of scalar fields; nested rows are printed separately.
fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if matches!(val, Value::Array(rows) if rows.first().is_some_and(Value::is_object)) {
            continue;
        }
        builder.push_record([key.as_str(), &format_scalar(val)]);
    }
    builder.build()
}

fn row_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    if let Some(Value::Object(first)) = rows.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        builder.push_record(headers.clone());
        for row in rows.iter().filter_map(Value::as_object) {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| row.get(h).map(format_scalar).unwrap_or_default()),
            );
        }
    } else {
        for item in rows {
            builder.push_record([format_scalar(item)]);
        }
    }
    builder.build()
}
