//! Detailed mark-sheets: one row per subject with code, marks, total in
//! words and grade.

use super::patterns::TABULAR_ROW;
use super::{FieldExtractor, RawRow, RawSubjectMatch};
use crate::certificate::LayoutStrategy;
use crate::models::record::Layout;

/// Tabular row rule.
///
/// Rows are matched left to right without overlap. Every row that fits the
/// shape is returned, including ones that are later discarded, so that a
/// skipped subject never shifts the rows after it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TabularRows;

impl TabularRows {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for TabularRows {
    type Output = RawSubjectMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TABULAR_ROW
            .captures_iter(text)
            .map(|caps| {
                RawSubjectMatch::Row(RawRow {
                    code: caps[1].to_string(),
                    name: caps[2].split_whitespace().collect::<Vec<_>>().join(" "),
                    theory: caps[3].to_string(),
                    practical: caps[4].to_string(),
                    total: caps[5].to_string(),
                    total_in_words: caps[6].split_whitespace().collect::<Vec<_>>().join(" "),
                    grade: caps[7].to_string(),
                })
            })
            .collect()
    }
}

impl LayoutStrategy for TabularRows {
    fn layout(&self) -> Layout {
        Layout::TabularRows
    }

    /// True when at least one row's marks add up. A stray line that merely
    /// fits the row shape (serial numbers, dates) does not count.
    fn detect(&self, text: &str) -> bool {
        self.extract_all(text).iter().any(|m| match m {
            RawSubjectMatch::Row(row) => row.marks_add_up(),
            RawSubjectMatch::Summary { .. } => false,
        })
    }

    fn subject_rows(&self, text: &str) -> Vec<RawSubjectMatch> {
        self.extract_all(text)
    }
}
