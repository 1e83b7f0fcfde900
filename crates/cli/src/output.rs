//! Text and JSON renderings of the bucket table.

use std::io::Write;

use serde::Serialize;
use vwap_core::{HourBucket, Result};

#[derive(Serialize)]
struct Row<'a> {
    hour: &'a str,
    #[serde(flatten)]
    bucket: &'a HourBucket,
}

/// Serialize the table as a JSON array. Missing values become `null`.
pub fn table_to_json(table: &[(String, HourBucket)]) -> Result<String> {
    let rows: Vec<Row<'_>> = table
        .iter()
        .map(|(hour, bucket)| Row { hour, bucket })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Print an aligned summary of the table.
pub fn print_table<W: Write>(out: &mut W, table: &[(String, HourBucket)]) -> Result<()> {
    writeln!(
        out,
        "{:<18} {:>14} {:>14} {:>16} {:>7}",
        "hour", "last price", "vwap", "volume", "trades"
    )?;
    for (label, bucket) in table {
        writeln!(
            out,
            "{:<18} {:>14} {:>14} {:>16.8} {:>7}",
            label,
            cell(bucket.last_price),
            cell(bucket.vwap),
            bucket.volume_sum,
            bucket.trade_count
        )?;
    }
    Ok(())
}
