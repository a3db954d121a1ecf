use serde_json::Value;
use std::io;

use super::{cell, schedule_rows};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout. Schedules are written one row per month.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = if let Some(rows) = schedule_rows(value) {
        write_records(&mut wtr, rows)
    } else {
        match value {
            Value::Array(arr) => write_records(&mut wtr, arr),
            Value::Object(map) => {
                let fields = map.get("result").and_then(Value::as_object).unwrap_or(map);
                wtr.write_record(["field", "value"]).and_then(|_| {
                    fields
                        .iter()
                        .filter(|(_, v)| !v.is_array() && !v.is_object())
                        .try_for_each(|(k, v)| wtr.write_record([k.as_str(), &cell(v)]))
                })
            }
            _ => wtr.write_record([cell(value)]),
        }
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        log::error!("CSV write error: {e}");
    }
}

fn write_records(wtr: &mut StdoutWriter<'_>, records: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = records.first() else {
        return records.iter().try_for_each(|v| wtr.write_record([cell(v)]));
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}
