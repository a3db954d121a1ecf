use serde_json::Value;

use super::cell;

/// Key answer fields, most important first.
const PRIORITY_KEYS: [&str; 4] = [
    "installment",
    "total_interest_paid",
    "payoff_month",
    "annual_rate_percent",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    // Rate timelines: one "month: rate" line per change
    if let Value::Array(events) = value {
        for e in events {
            println!(
                "{}: {}",
                e.get("from_month").map(cell).unwrap_or_default(),
                e.get("annual_rate_percent").map(cell).unwrap_or_default()
            );
        }
        return;
    }

    let result = value.get("result").unwrap_or(value);

    if let Some(v) = PRIORITY_KEYS
        .iter()
        .filter_map(|k| result.get(*k))
        .find(|v| !v.is_null())
    {
        println!("{}", cell(v));
        return;
    }

    // A bare schedule carries its installment on the first reset
    if let Some(v) = result.pointer("/resets/0/installment") {
        println!("{}", cell(v));
        return;
    }

    println!("{}", cell(result));
}
