//! Student mark-sheet data models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder stored when a scalar field cannot be located.
pub const UNKNOWN: &str = "Unknown";

/// Scalar fields read once per certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Candidate's full name.
    StudentName,
    /// Register (roll) number.
    RegisterNumber,
    /// Mother's name.
    MotherName,
    /// Guardian's or father's name.
    GuardianName,
    /// Name of the school or institution.
    SchoolName,
}

impl FieldName {
    /// All fields, in the order they are extracted.
    pub const ALL: [FieldName; 5] = [
        FieldName::StudentName,
        FieldName::RegisterNumber,
        FieldName::MotherName,
        FieldName::GuardianName,
        FieldName::SchoolName,
    ];

    /// Column-style name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::StudentName => "name",
            FieldName::RegisterNumber => "register_number",
            FieldName::MotherName => "mother_name",
            FieldName::GuardianName => "guardian_name",
            FieldName::SchoolName => "school_name",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved scalar fields. Every field has a value; missing ones hold [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalarFields(BTreeMap<FieldName, String>);

impl ScalarFields {
    /// All fields set to [`UNKNOWN`].
    pub fn unknown() -> Self {
        Self(
            FieldName::ALL
                .iter()
                .map(|f| (*f, UNKNOWN.to_string()))
                .collect(),
        )
    }

    /// Set a field value.
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    /// Get a field value, [`UNKNOWN`] if it was never set.
    pub fn get(&self, field: FieldName) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or(UNKNOWN)
    }

    /// Get a field value, `None` when it holds the sentinel.
    pub fn known(&self, field: FieldName) -> Option<&str> {
        Some(self.get(field)).filter(|v| *v != UNKNOWN)
    }

    /// Fields still holding the sentinel.
    pub fn missing(&self) -> Vec<FieldName> {
        FieldName::ALL
            .iter()
            .copied()
            .filter(|f| self.known(*f).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl Default for ScalarFields {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Marks for a single subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Subject code (tabular mark-sheets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Subject name as printed.
    pub name: String,

    /// Theory marks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theory: Option<u32>,

    /// Practical marks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical: Option<u32>,

    /// Total marks.
    pub total: u32,

    /// Total written in words, e.g. "SIXTY EIGHT".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_in_words: Option<String>,

    /// Grade symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl SubjectRecord {
    /// A summary-style record carrying only a total.
    pub fn total_only(name: impl Into<String>, total: u32) -> Self {
        Self {
            code: None,
            name: name.into(),
            theory: None,
            practical: None,
            total,
            total_in_words: None,
            grade: None,
        }
    }

    /// Code if present, otherwise the subject name.
    pub fn identifier(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }
}

/// Certificate layout families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Summary certificate: known subject labels followed by a total and grade.
    FixedSubjectList,
    /// Detailed mark-sheet: code, name, theory, practical, total, words, grade per row.
    TabularRows,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::FixedSubjectList => f.write_str("fixed_subject_list"),
            Layout::TabularRows => f.write_str("tabular_rows"),
        }
    }
}

/// Where the document text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Embedded PDF text layer.
    TextLayer,
    /// OCR over page images.
    Ocr,
}

impl TextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSource::TextLayer => "text_layer",
            TextSource::Ocr => "ocr",
        }
    }
}

/// Everything extracted from one certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Layout the subject rows were read with.
    pub layout: Layout,

    /// Source of the text.
    pub source: TextSource,

    /// Scalar fields.
    pub scalars: ScalarFields,

    /// Subject marks. Document order for tabular sheets, by name for summaries.
    pub subjects: Vec<SubjectRecord>,

    /// Non-fatal issues met while extracting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExtractedRecord {
    /// Whether any subject marks were found.
    pub fn has_subjects(&self) -> bool {
        !self.subjects.is_empty()
    }

    /// Sum of all subject totals.
    pub fn grand_total(&self) -> u64 {
        self.subjects.iter().map(|s| u64::from(s.total)).sum()
    }
}
