use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Format output as tables using the tabled crate.
///
/// Scalar fields go in a Field/Value table; every array of objects (schedule
/// rows, resets, yearly totals) gets its own titled table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_envelope(result, map),
            _ => print_object(map),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{value}"),
    }
}

fn print_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_object(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_array() && !v.is_object()) {
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));

    for (key, val) in map {
        match val {
            Value::Array(arr) if !arr.is_empty() => {
                println!("\n{}:", title(key));
                print_records(arr);
            }
            Value::Object(inner) => {
                println!("\n{}:", title(key));
                print_object(inner);
            }
            _ => {}
        }
    }
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(cell).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
