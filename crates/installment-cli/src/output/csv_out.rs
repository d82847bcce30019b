use serde_json::Value;
use std::io;

use super::{format_scalar, row_field};

/// Write output as CSV to stdout.
///
/// Results with installment rows are written one row per installment;
/// anything else becomes a two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => {
            if let Some((_, rows)) = row_field(map) {
                write_rows(wtr, rows)?;
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &format_scalar(val)])?;
                }
            }
        }
        Value::Array(rows) => write_rows(wtr, rows)?,
        other => wtr.write_record([format_scalar(other)])?,
    }
    wtr.flush()?;
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_schedule_rows() {
        let out = json!({"result": {
            "monthly_payment": "50.00",
            "schedule": [
                {"month": 1, "amount": "50.00", "edits": []},
                {"month": 2, "amount": "50.00", "edits": []},
            ],
        }});
        // serde_json maps iterate in key order
        assert_eq!(render(&out), "amount,edits,month\n50.00,,1\n50.00,,2\n");
    }

    #[test]
    fn test_quote_as_fields() {
        let out = json!({"result": {"interest": "50.00", "payoff_amount": "5050.00"}});
        assert_eq!(render(&out), "field,value\ninterest,50.00\npayoff_amount,5050.00\n");
    }
}
