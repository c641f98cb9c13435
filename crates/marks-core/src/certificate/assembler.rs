//! Turns raw rule matches into a validated [`ExtractedRecord`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::Extraction;
use super::rules::{RawRow, RawSubjectMatch, parse_mark};
use crate::models::config::ExtractionConfig;
use crate::models::record::{ExtractedRecord, Layout, SubjectRecord, TextSource};

/// Validates subject matches and builds the final record.
#[derive(Debug, Clone, Default)]
pub struct RecordAssembler {
    excluded: Vec<String>,
}

impl RecordAssembler {
    /// Create an assembler dropping tabular rows whose name contains any of
    /// `excluded` (case-insensitive).
    pub fn new(excluded: Vec<String>) -> Self {
        Self {
            excluded: excluded.into_iter().map(|k| k.to_uppercase()).collect(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.excluded_subjects.clone())
    }

    fn is_excluded(&self, name: &str) -> bool {
        let name = name.to_uppercase();
        self.excluded.iter().any(|k| !k.is_empty() && name.contains(k.as_str()))
    }

    /// Assemble a record from one extraction.
    pub fn assemble(&self, extraction: Extraction, source: TextSource) -> ExtractedRecord {
        let mut warnings: Vec<String> = extraction
            .scalars
            .missing()
            .into_iter()
            .map(|field| format!("{} not found", field))
            .collect();

        let subjects = match extraction.layout {
            Layout::FixedSubjectList => self.summary_subjects(extraction.rows, &mut warnings),
            Layout::TabularRows => self.tabular_subjects(extraction.rows, &mut warnings),
        };

        if subjects.is_empty() {
            warnings.push("no subject marks found".to_string());
        }

        for w in &warnings {
            debug!("{}", w);
        }

        ExtractedRecord {
            layout: extraction.layout,
            source,
            scalars: extraction.scalars,
            subjects,
            warnings,
        }
    }

    fn summary_subjects(
        &self,
        rows: Vec<RawSubjectMatch>,
        warnings: &mut Vec<String>,
    ) -> Vec<SubjectRecord> {
        let mut totals: BTreeMap<String, u32> = BTreeMap::new();

        for row in rows {
            let (subject, raw_total) = match row {
                RawSubjectMatch::Summary { subject, total } => (subject, total),
                RawSubjectMatch::Row(r) => (r.name, r.total),
            };

            match parse_mark(&raw_total) {
                Some(total) => {
                    totals.insert(subject, total);
                }
                None => {
                    warn!("Skipping {}: total {:?} is not a number", subject, raw_total);
                    warnings.push(format!("{}: unreadable total {:?}", subject, raw_total));
                }
            }
        }

        totals
            .into_iter()
            .map(|(name, total)| SubjectRecord::total_only(name, total))
            .collect()
    }

    fn tabular_subjects(
        &self,
        rows: Vec<RawSubjectMatch>,
        warnings: &mut Vec<String>,
    ) -> Vec<SubjectRecord> {
        let mut subjects = Vec::new();

        for row in rows {
            let row = match row {
                RawSubjectMatch::Row(r) => r,
                RawSubjectMatch::Summary { subject, total } => RawRow {
                    code: String::new(),
                    name: subject,
                    theory: String::new(),
                    practical: String::new(),
                    total,
                    total_in_words: String::new(),
                    grade: String::new(),
                },
            };

            if self.is_excluded(&row.name) {
                debug!("Excluding subject {}", row.name);
                continue;
            }

            if let Some(subject) = self.tabular_record(row, warnings) {
                subjects.push(subject);
            }
        }

        subjects
    }

    fn tabular_record(&self, row: RawRow, warnings: &mut Vec<String>) -> Option<SubjectRecord> {
        let Some(total) = parse_mark(&row.total) else {
            warn!("Skipping {} {}: total {:?} is not a number", row.code, row.name, row.total);
            warnings.push(format!("{}: unreadable total {:?}", row.name, row.total));
            return None;
        };

        let mut component = |label: &str, raw: &str| {
            parse_mark(raw).or_else(|| {
                warnings.push(format!("{}: {} {:?} read as 0", row.name, label, raw));
                Some(0)
            })
        };
        let theory = component("theory", &row.theory);
        let practical = component("practical", &row.practical);

        Some(SubjectRecord {
            code: non_empty(row.code),
            name: row.name,
            theory,
            practical,
            total,
            total_in_words: non_empty(row.total_in_words),
            grade: non_empty(row.grade),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
