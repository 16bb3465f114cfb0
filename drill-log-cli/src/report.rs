//! Session summary and tag listing

use drill_log_decoder::{Diagnostic, Sample, TagTable, Termination, Timestamp};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

/// Counts collected over one traversal of a session
#[derive(Debug, Default)]
pub struct SessionSummary {
    pub total_samples: usize,
    pub unknown_samples: usize,
    pub first_time: Option<Timestamp>,
    pub last_time: Option<Timestamp>,
    pub per_tag: BTreeMap<String, usize>,
    pub termination: Option<Termination>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &Sample) {
        self.total_samples += 1;
        if sample.tag.is_unknown() {
            self.unknown_samples += 1;
        }

        // File order is not guaranteed to be time order
        self.first_time = Some(match self.first_time {
            Some(t) if t <= sample.timestamp => t,
            _ => sample.timestamp,
        });
        self.last_time = Some(match self.last_time {
            Some(t) if t >= sample.timestamp => t,
            _ => sample.timestamp,
        });

        *self.per_tag.entry(sample.tag.label()).or_insert(0) += 1;
    }

    pub fn print(&self, out: &mut dyn Write, tag_file: &Path, value_file: &Path, tags: &TagTable) -> io::Result<()> {
        writeln!(out, "=== DRILL LOG SUMMARY ===")?;
        writeln!(out, "Tag file:   {:?}", tag_file)?;
        writeln!(out, "Float file: {:?}", value_file)?;
        writeln!(out, "Tags defined: {}", tags.len())?;
        writeln!(out, "Samples decoded: {}", self.total_samples)?;
        writeln!(out, "Samples with unknown tag: {}", self.unknown_samples)?;

        match (self.first_time, self.last_time) {
            (Some(first), Some(last)) => {
                writeln!(out, "Time span: {} .. {} ({:.3}s)", first, last, seconds_between(first, last))?;
            }
            _ => writeln!(out, "Time span: (no samples)")?,
        }

        match self.termination {
            Some(termination) => writeln!(out, "Stream ended at: {}", termination)?,
            None => writeln!(out, "Stream ended at: sample limit")?,
        }

        if !self.diagnostics.is_empty() {
            writeln!(out, "\nDecode diagnostics: {}", self.diagnostics.len())?;
            for diagnostic in &self.diagnostics {
                writeln!(out, "  {}", diagnostic)?;
            }
        }

        if !self.per_tag.is_empty() {
            writeln!(out, "\nSamples per tag:")?;
            let mut sorted: Vec<_> = self.per_tag.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (name, count) in sorted {
                writeln!(out, "  {}: {}", name, count)?;
            }
        }

        Ok(())
    }
}

fn seconds_between(first: Timestamp, last: Timestamp) -> f64 {
    let span = last - first;
    span.num_milliseconds() as f64 / 1000.0
}

/// Print the tag table ordered by index
pub fn print_tags(out: &mut dyn Write, tags: &TagTable) -> io::Result<()> {
    writeln!(out, "{:>5}  {:>4}  {:>5}  NAME", "INDEX", "TYPE", "DTYPE")?;
    for tag in tags.iter() {
        writeln!(out, "{:>5}  {:>4}  {:>5}  {}", tag.index, tag.tag_type, tag.dtype, tag.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use drill_log_decoder::{Tag, TagRef};

    fn sample(second: u32, tag: TagRef) -> Sample {
        Sample {
            timestamp: NaiveDate::from_ymd_opt(2024, 2, 20)
                .unwrap()
                .and_hms_opt(0, 0, second)
                .unwrap(),
            tag,
            value: 0.0,
            status: 0,
            marker: 0,
            internal: 0,
        }
    }

    fn known(name: &str, index: u32) -> TagRef {
        TagRef::Known(Tag {
            name: name.to_string(),
            index,
            tag_type: 1,
            dtype: 8,
        })
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = SessionSummary::new();
        summary.record(&sample(9, known("[PLC]CABLESPEED", 1)));
        summary.record(&sample(3, known("[PLC]CABLESPEED", 1)));
        summary.record(&sample(5, TagRef::Unknown { index: 40 }));

        assert_eq!(summary.total_samples, 3);
        assert_eq!(summary.unknown_samples, 1);
        assert_eq!(summary.per_tag.get("[PLC]CABLESPEED"), Some(&2));
        assert_eq!(summary.first_time.map(|t| t.format("%S").to_string()), Some("03".to_string()));
        assert_eq!(summary.last_time.map(|t| t.format("%S").to_string()), Some("09".to_string()));
    }

    #[test]
    fn test_print_summary() {
        let mut summary = SessionSummary::new();
        summary.record(&sample(0, known("[PLC]CABLESPEED", 1)));
        summary.record(&sample(2, known("[PLC]CABLESPEED", 1)));
        summary.termination = Some(Termination::Sentinel);

        let mut out = Vec::new();
        summary
            .print(&mut out, Path::new("a (Tagname).DAT"), Path::new("a (Float).DAT"), &TagTable::new())
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Samples decoded: 2"));
        assert!(text.contains("(2.000s)"));
        assert!(text.contains("Stream ended at: end-of-data sentinel"));
        assert!(text.contains("  [PLC]CABLESPEED: 2"));
    }

    #[test]
    fn test_print_tags() {
        let table: TagTable = vec![Tag {
            name: "[PLC]IMUROLL".to_string(),
            index: 12,
            tag_type: 2,
            dtype: 4,
        }]
        .into_iter()
        .collect();

        let mut out = Vec::new();
        print_tags(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("[PLC]IMUROLL"));
    }
}
