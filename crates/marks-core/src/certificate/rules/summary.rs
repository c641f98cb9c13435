//! Summary certificates: a closed list of subject labels, each followed
//! somewhere by its total and a grade.

use regex::Regex;

use super::patterns::summary_pattern;
use super::tabular::TabularRows;
use super::{FieldExtractor, RawSubjectMatch};
use crate::certificate::LayoutStrategy;
use crate::error::MarksError;
use crate::models::record::Layout;

/// Fixed subject vocabulary rule.
pub struct FixedSubjectList {
    subjects: Vec<(String, Regex)>,
}

impl FixedSubjectList {
    /// Compile one pattern per subject label. Blank labels are rejected.
    pub fn new<S: AsRef<str>>(subjects: &[S]) -> Result<Self, MarksError> {
        let subjects = subjects
            .iter()
            .map(|s| {
                let label = s.as_ref().trim();
                if label.is_empty() {
                    return Err(MarksError::Config("blank subject label".to_string()));
                }
                summary_pattern(label)
                    .map(|re| (label.to_string(), re))
                    .map_err(|e| MarksError::Config(format!("invalid subject label {:?}: {}", label, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { subjects })
    }
}

impl FieldExtractor for FixedSubjectList {
    type Output = RawSubjectMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// One match per vocabulary entry found, in vocabulary order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.subjects
            .iter()
            .filter_map(|(subject, re)| {
                re.captures(text).map(|caps| RawSubjectMatch::Summary {
                    subject: subject.clone(),
                    total: caps[1].to_string(),
                })
            })
            .collect()
    }
}

impl LayoutStrategy for FixedSubjectList {
    fn layout(&self) -> Layout {
        Layout::FixedSubjectList
    }

    fn detect(&self, text: &str) -> bool {
        !TabularRows.detect(text) && self.subjects.iter().any(|(_, re)| re.is_match(text))
    }

    fn subject_rows(&self, text: &str) -> Vec<RawSubjectMatch> {
        self.extract_all(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::default_subjects;
    use pretty_assertions::assert_eq;

    fn summary(subject: &str, total: &str) -> RawSubjectMatch {
        RawSubjectMatch::Summary {
            subject: subject.to_string(),
            total: total.to_string(),
        }
    }

    #[test]
    fn test_subject_followed_by_total_and_grade() {
        let rule = FixedSubjectList::new(&default_subjects()).unwrap();
        let rows = rule.extract_all("PHYSICS ... 78 A+");
        assert_eq!(rows, vec![summary("PHYSICS", "78")]);
    }

    #[test]
    fn test_absent_subject_yields_no_row() {
        let rule = FixedSubjectList::new(&["PHYSICS", "CHEMISTRY"]).unwrap();
        let rows = rule.extract_all("PHYSICS 78 A+\nTOTAL 400");
        assert_eq!(rows, vec![summary("PHYSICS", "78")]);
    }

    #[test]
    fn test_total_may_be_on_later_line() {
        let rule = FixedSubjectList::new(&["COMPUTER SCIENCE"]).unwrap();
        let rows = rule.extract_all("COMPUTER SCIENCE\n(Theory + Practical)\n195 A+");
        assert_eq!(rows, vec![summary("COMPUTER SCIENCE", "195")]);
    }

    #[test]
    fn test_label_is_case_sensitive() {
        let rule = FixedSubjectList::new(&["PHYSICS"]).unwrap();
        assert!(rule.extract_all("physics 78 A").is_empty());
    }

    #[test]
    fn test_vocabulary_order() {
        let rule = FixedSubjectList::new(&["CHEMISTRY", "ENGLISH"]).unwrap();
        let rows = rule.extract_all("ENGLISH 150 A\nCHEMISTRY 120 B+");
        assert_eq!(rows, vec![summary("CHEMISTRY", "120"), summary("ENGLISH", "150")]);
        assert_eq!(rule.extract("ENGLISH 150 A"), Some(summary("ENGLISH", "150")));
    }

    #[test]
    fn test_blank_label_rejected() {
        assert!(matches!(
            FixedSubjectList::new(&["PHYSICS", ""]),
            Err(MarksError::Config(_))
        ));
        assert!(matches!(
            FixedSubjectList::new(&[" \t"]),
            Err(MarksError::Config(_))
        ));
    }

    #[test]
    fn test_detect() {
        let rule = FixedSubjectList::new(&default_subjects()).unwrap();
        assert!(rule.detect("ENGLISH 150 A"));
        assert!(!rule.detect("101 ENGLISH 45 23 68 SIXTY EIGHT A"));
        assert!(!rule.detect("no subjects here"));
    }
}
