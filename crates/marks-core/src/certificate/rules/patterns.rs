//! Common regex patterns for mark-sheet extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Register / roll number
    pub static ref REGISTER_NUMBER: Regex = Regex::new(
        r"(?i)\bRegister\s+Number\s*[:.\-]?\s*(\d+)"
    ).unwrap();

    pub static ref REGISTER_NO: Regex = Regex::new(
        r"(?i)\bReg(?:ister|\.)?\s*No\.?\s*[:\-]?\s*(\d+)"
    ).unwrap();

    pub static ref ROLL_NUMBER: Regex = Regex::new(
        r"(?i)\bRoll\s*(?:Number|No\.?)\s*[:\-]?\s*(\d+)"
    ).unwrap();

    // Candidate name. Master and Kumari only in title case: "MASTER" is
    // too common a word on certificates.
    pub static ref HONORIFIC_NAME: Regex = Regex::new(
        r"\b(?:(?i:Mr|Ms|Mrs)|Master|Kumari)(?:\.[ \t]*|[ \t]+)([A-Za-z][A-Za-z .]*)"
    ).unwrap();

    pub static ref CERTIFY_NAME: Regex = Regex::new(
        r"(?i)certify\s+that\s+([A-Za-z][A-Za-z .]*?)\s+(?:has\s+)?appeared"
    ).unwrap();

    pub static ref NAME_OF_CANDIDATE: Regex = Regex::new(
        r"(?i)\bName[ \t]+of[ \t]+(?:the[ \t]+)?Candidate[ \t]*[:\-]?[ \t]*([A-Za-z .]*)"
    ).unwrap();

    // Labelled names: label, optional colon, then a run up to end of line
    pub static ref MOTHER_NAME: Regex = Regex::new(
        r"(?i)\bMother['’]?s?[ \t]+Name[ \t]*[:\-]?[ \t]*([A-Za-z .]*)"
    ).unwrap();

    pub static ref GUARDIAN_NAME: Regex = Regex::new(
        r"(?i)\bGuardian['’]?s?[ \t]+Name[ \t]*[:\-]?[ \t]*([A-Za-z .]*)"
    ).unwrap();

    pub static ref FATHER_NAME: Regex = Regex::new(
        r"(?i)\bFather['’]?s?[ \t]+Name[ \t]*[:\-]?[ \t]*([A-Za-z .]*)"
    ).unwrap();

    pub static ref SCHOOL_NAME_OF: Regex = Regex::new(
        r"(?i)\bName[ \t]+of[ \t]+(?:the[ \t]+)?(?:School|Institution)[ \t]*[:\-]?[ \t]*([A-Za-z .&]*)"
    ).unwrap();

    pub static ref SCHOOL_LABEL: Regex = Regex::new(
        r"(?i)\bSchool(?:[ \t]+Name)?[ \t]*[:\-][ \t]*([A-Za-z .&]*)"
    ).unwrap();

    // Start of the next label; a captured run is cut here
    pub static ref LABEL_BOUNDARY: Regex = Regex::new(
        r"(?i)\b(?:(?:father|mother|guardian)['’]?s?\s+name|name\s+of\s+(?:the\s+)?(?:school|institution|candidate)|school\s+name|school\s*:|register\s+(?:number|no)|reg\.?\s*no|roll\s+(?:number|no)|date\s+of\s+birth|(?:has\s+)?appeared)"
    ).unwrap();

    // Detailed mark-sheet row:
    // code, subject, theory, practical, total, total in words, grade
    pub static ref TABULAR_ROW: Regex = Regex::new(
        r"(?x)
        \b(\d{3})\s+
        ([A-Za-z][A-Za-z.&()/\-]*(?:[\ \t]+[A-Za-z.&()/\-]+)*?)\s+
        (\d+|[A-Za-z]{1,3}|[-*]+)\s+
        (\d+|[A-Za-z]{1,3}|[-*]+)\s+
        (\d+|[A-Za-z]{1,3}|[-*]+)\s+
        ([A-Za-z]+(?:[\ \t]+[A-Za-z]+)*?)\s+
        ([A-Za-z][0-9+\-]?)
        (?:\s|$)"
    ).unwrap();
}

/// Pattern for one subject label on a summary certificate: the label, then
/// the first number that is followed by a grade letter.
pub fn summary_pattern(subject: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?s){}.*?(\d+)\s+[A-Z+]", regex::escape(subject)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_number_variants() {
        assert_eq!(&REGISTER_NUMBER.captures("Register Number 2012345").unwrap()[1], "2012345");
        assert_eq!(&REGISTER_NUMBER.captures("REGISTER NUMBER: 77").unwrap()[1], "77");
        assert_eq!(&REGISTER_NO.captures("Reg. No: 4455").unwrap()[1], "4455");
        assert_eq!(&ROLL_NUMBER.captures("Roll No. 31").unwrap()[1], "31");
    }

    #[test]
    fn test_honorific_needs_separator() {
        assert!(HONORIFIC_NAME.captures("MSc Physics").is_none());
        assert_eq!(&HONORIFIC_NAME.captures("Ms.ANU").unwrap()[1], "ANU");
        assert_eq!(&HONORIFIC_NAME.captures("MR. ARUN").unwrap()[1], "ARUN");
    }

    #[test]
    fn test_master_kumari_title_case_only() {
        assert_eq!(&HONORIFIC_NAME.captures("Master ARJUN P").unwrap()[1], "ARJUN P");
        assert_eq!(&HONORIFIC_NAME.captures("Kumari DIVYA S").unwrap()[1], "DIVYA S");
        assert!(HONORIFIC_NAME.captures("Name: MASTER DATA SYSTEMS").is_none());
        assert!(HONORIFIC_NAME.captures("kumari devi").is_none());
    }

    #[test]
    fn test_labelled_name_stops_at_newline() {
        let caps = MOTHER_NAME.captures("Mother's Name: LATHA K\nNext line").unwrap();
        assert_eq!(&caps[1], "LATHA K");
    }

    #[test]
    fn test_tabular_row_groups() {
        let caps = TABULAR_ROW
            .captures("101 ENGLISH 45 23 68 SIXTY EIGHT A")
            .unwrap();
        let groups: Vec<&str> = (1..=7).map(|i| caps.get(i).unwrap().as_str()).collect();
        assert_eq!(groups, ["101", "ENGLISH", "45", "23", "68", "SIXTY EIGHT", "A"]);
    }

    #[test]
    fn test_tabular_row_multiword_subject() {
        let caps = TABULAR_ROW
            .captures("104 COMPUTER SCIENCE 60 38 98 NINETY EIGHT A+")
            .unwrap();
        assert_eq!(&caps[2], "COMPUTER SCIENCE");
        assert_eq!(&caps[5], "98");
        assert_eq!(&caps[7], "A+");
    }

    #[test]
    fn test_summary_pattern_escapes_label() {
        let re = summary_pattern("MATHEMATICS-SCI").unwrap();
        let caps = re.captures("MATHEMATICS-SCI\nC+ 089 A").unwrap();
        assert_eq!(&caps[1], "089");
    }
}
