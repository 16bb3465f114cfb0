//! Wide-table tabulation of a decoded series
//!
//! Pivots samples into one row per distinct timestamp and one column per tag
//! label. Cells without a sample are `None`. When the same (timestamp, tag)
//! pair appears more than once, the last sample wins.

use crate::types::{Sample, Timestamp};
use std::collections::{BTreeMap, BTreeSet};

/// Timestamp-indexed table with tag-named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    /// Column labels, sorted
    columns: Vec<String>,
    /// Row cells, aligned with `columns`
    rows: BTreeMap<Timestamp, Vec<Option<f64>>>,
}

impl WideTable {
    /// Pivot a sample sequence
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut cells: BTreeMap<Timestamp, BTreeMap<String, f64>> = BTreeMap::new();
        let mut labels = BTreeSet::new();

        for sample in samples {
            let label = sample.tag.label();
            labels.insert(label.clone());
            cells.entry(sample.timestamp).or_default().insert(label, sample.value);
        }

        let columns: Vec<String> = labels.into_iter().collect();
        let rows: BTreeMap<Timestamp, Vec<Option<f64>>> = cells
            .into_iter()
            .map(|(timestamp, values)| {
                let row = columns.iter().map(|c| values.get(c).copied()).collect();
                (timestamp, row)
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row keys in ascending order
    pub fn timestamps(&self) -> impl Iterator<Item = &Timestamp> {
        self.rows.keys()
    }

    /// Rows in ascending timestamp order, cells aligned with [`columns`](Self::columns)
    pub fn rows(&self) -> impl Iterator<Item = (&Timestamp, &[Option<f64>])> {
        self.rows.iter().map(|(ts, row)| (ts, row.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(column)).ok()
    }

    /// Value at one cell; `None` for gaps and unknown rows/columns
    pub fn get(&self, timestamp: &Timestamp, column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows.get(timestamp).and_then(|row| row[index])
    }

    /// All cells of one column, in row order
    pub fn column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(column)?;
        Some(self.rows.values().map(|row| row[index]).collect())
    }

    /// Sub-table restricted to the named columns
    ///
    /// Names not present in the table are ignored. All rows are kept, even
    /// those that end up with no values.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> WideTable {
        let selected: BTreeSet<(String, usize)> = columns
            .iter()
            .filter_map(|c| {
                let name = c.as_ref();
                self.column_index(name).map(|i| (name.to_string(), i))
            })
            .collect();

        let rows: BTreeMap<Timestamp, Vec<Option<f64>>> = self
            .rows
            .iter()
            .map(|(ts, row)| (*ts, selected.iter().map(|(_, i)| row[*i]).collect()))
            .collect();

        WideTable {
            columns: selected.into_iter().map(|(name, _)| name).collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tag, TagRef};
    use chrono::NaiveDate;

    fn ts(second: u32, milli: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_milli_opt(0, 0, second, milli)
            .unwrap()
    }

    fn sample(timestamp: Timestamp, name: &str, index: u32, value: f64) -> Sample {
        Sample {
            timestamp,
            tag: TagRef::Known(Tag {
                name: name.to_string(),
                index,
                tag_type: 1,
                dtype: 8,
            }),
            value,
            status: 0,
            marker: 0,
            internal: 0,
        }
    }

    #[test]
    fn test_two_tags_two_timestamps_with_gap() {
        let table = WideTable::from_samples(vec![
            sample(ts(0, 0), "[PLC]DRILLACTIVECURRENT", 1, 1.5),
            sample(ts(0, 0), "[PLC]DRILLFEEDBACKVEL", 2, -0.2),
            sample(ts(1, 0), "[PLC]DRILLACTIVECURRENT", 1, 1.7),
        ]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.columns(),
            &["[PLC]DRILLACTIVECURRENT".to_string(), "[PLC]DRILLFEEDBACKVEL".to_string()]
        );
        assert_eq!(table.get(&ts(0, 0), "[PLC]DRILLFEEDBACKVEL"), Some(-0.2));
        assert_eq!(table.get(&ts(1, 0), "[PLC]DRILLFEEDBACKVEL"), None);
        assert_eq!(
            table.column("[PLC]DRILLACTIVECURRENT"),
            Some(vec![Some(1.5), Some(1.7)])
        );
    }

    #[test]
    fn test_rows_sorted_and_collisions_overwrite() {
        let table = WideTable::from_samples(vec![
            sample(ts(5, 0), "a", 1, 1.0),
            sample(ts(2, 250), "a", 1, 2.0),
            sample(ts(5, 0), "a", 1, 3.0),
        ]);

        let keys: Vec<Timestamp> = table.timestamps().copied().collect();
        assert_eq!(keys, vec![ts(2, 250), ts(5, 0)]);
        assert_eq!(table.get(&ts(5, 0), "a"), Some(3.0));
    }

    #[test]
    fn test_unknown_tags_get_labelled_columns() {
        let mut unknown = sample(ts(0, 0), "ignored", 0, 9.0);
        unknown.tag = TagRef::Unknown { index: 77 };

        let table = WideTable::from_samples(vec![unknown]);
        assert_eq!(table.columns(), &["UNKNOWN[77]".to_string()]);
    }

    #[test]
    fn test_select_columns() {
        let table = WideTable::from_samples(vec![
            sample(ts(0, 0), "a", 1, 1.0),
            sample(ts(0, 0), "b", 2, 2.0),
            sample(ts(1, 0), "c", 3, 3.0),
        ]);

        let selected = table.select(&["c", "a", "missing"]);
        assert_eq!(selected.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(selected.row_count(), 2);

        let rows: Vec<Vec<Option<f64>>> = selected.rows().map(|(_, r)| r.to_vec()).collect();
        assert_eq!(rows, vec![vec![Some(1.0), None], vec![None, Some(3.0)]]);
    }

    #[test]
    fn test_empty_series() {
        let table = WideTable::from_samples(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }
}
