//! Sample (JSON lines) and wide-table (CSV) export

use anyhow::Result;
use drill_log_decoder::{Sample, WideTable};
use std::io::Write;

/// Timestamp layout used in CSV rows
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Write one JSON object per sample; returns the number written
pub fn write_samples<W, I>(out: &mut W, samples: I) -> Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = Sample>,
{
    let mut count = 0;
    for sample in samples {
        serde_json::to_writer(&mut *out, &sample)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Write the table as CSV: a `time` column followed by one column per tag
///
/// Gaps are written as empty cells.
pub fn write_table<W: Write>(out: W, table: &WideTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = vec!["time".to_string()];
    header.extend(table.columns().iter().cloned());
    wtr.write_record(&header)?;

    for (timestamp, cells) in table.rows() {
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(timestamp.format(CSV_TIME_FORMAT).to_string());
        record.extend(cells.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
