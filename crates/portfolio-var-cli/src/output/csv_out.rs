use serde_json::Value;
use std::io;

use super::{format_scalar, result_of};

/// Write output as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: io::Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    match result_of(value) {
        Value::Object(map) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in map {
                wtr.write_record([key.as_str(), &format_scalar(val, "")])?;
            }
        }
        other => wtr.write_record([&format_scalar(other, "")])?,
    }

    wtr.flush()?;
    Ok(())
}
