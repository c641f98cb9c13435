//! Rule-based extractors for mark-sheet certificates.

pub mod patterns;
pub mod scalar;
pub mod summary;
pub mod tabular;

pub use scalar::{ScalarRule, default_scalar_rules};
pub use summary::FixedSubjectList;
pub use tabular::TabularRows;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A captured value with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range of the whole match in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// One tabular mark row, as captured. Numbers are still text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub code: String,
    pub name: String,
    pub theory: String,
    pub practical: String,
    pub total: String,
    pub total_in_words: String,
    pub grade: String,
}

impl RawRow {
    /// Whether the marks add up: the total parses, equals theory plus
    /// practical when both parse, and is never below a single one.
    pub fn marks_add_up(&self) -> bool {
        let Some(total) = parse_mark(&self.total) else {
            return false;
        };
        match (parse_mark(&self.theory), parse_mark(&self.practical)) {
            (Some(t), Some(p)) => t.checked_add(p) == Some(total),
            (Some(part), None) | (None, Some(part)) => part <= total,
            (None, None) => true,
        }
    }
}

/// A subject match before numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSubjectMatch {
    /// Known subject label with the total that followed it.
    Summary { subject: String, total: String },
    /// Full tabular row.
    Row(RawRow),
}

impl RawSubjectMatch {
    /// Subject name of the match.
    pub fn subject(&self) -> &str {
        match self {
            RawSubjectMatch::Summary { subject, .. } => subject,
            RawSubjectMatch::Row(row) => &row.name,
        }
    }
}

/// Parse a captured mark; `None` for anything that is not a non-negative integer.
pub fn parse_mark(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}
