//! Scalar field rules: labelled values read once per certificate.

use regex::Regex;

use super::patterns::*;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::record::FieldName;

/// Candidate patterns for one field, tried in priority order.
///
/// Capture group 1 of each pattern holds the value. Only the first match of a
/// pattern is considered; an empty capture moves on to the next pattern.
pub struct ScalarRule {
    field: FieldName,
    patterns: Vec<&'static Regex>,
}

impl ScalarRule {
    pub fn new(field: FieldName, patterns: Vec<&'static Regex>) -> Self {
        Self { field, patterns }
    }

    pub fn field(&self) -> FieldName {
        self.field
    }

    fn capture(&self, pattern: &Regex, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = pattern.captures(text)?;
        let whole = caps.get(0)?;
        let group = caps.get(1)?;

        let value = normalize(cut_at_label(text, group.start(), group.end()));
        if value.is_empty() {
            return None;
        }

        Some(ExtractionMatch::new(value, whole.as_str()).with_position(whole.start(), whole.end()))
    }
}

impl FieldExtractor for ScalarRule {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns.iter().find_map(|p| self.capture(p, text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .filter_map(|p| self.capture(p, text))
            .collect()
    }
}

/// Truncate a captured run where the next label begins.
fn cut_at_label(text: &str, start: usize, end: usize) -> &str {
    let line_end = text[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(text.len());

    match LABEL_BOUNDARY.find(&text[start..line_end]) {
        Some(m) if start + m.start() < end => &text[start..start + m.start()],
        _ => &text[start..end],
    }
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Built-in rules for every [`FieldName`].
pub fn default_scalar_rules() -> Vec<ScalarRule> {
    vec![
        ScalarRule::new(
            FieldName::StudentName,
            vec![&*HONORIFIC_NAME, &*CERTIFY_NAME, &*NAME_OF_CANDIDATE],
        ),
        ScalarRule::new(
            FieldName::RegisterNumber,
            vec![&*REGISTER_NUMBER, &*REGISTER_NO, &*ROLL_NUMBER],
        ),
        ScalarRule::new(FieldName::MotherName, vec![&*MOTHER_NAME]),
        ScalarRule::new(
            FieldName::GuardianName,
            vec![&*GUARDIAN_NAME, &*FATHER_NAME],
        ),
        ScalarRule::new(
            FieldName::SchoolName,
            vec![&*SCHOOL_NAME_OF, &*SCHOOL_LABEL],
        ),
    ]
}
