//! Mark-sheet field extraction and record assembly.

mod assembler;
mod parser;
pub mod rules;

pub use assembler::RecordAssembler;
pub use parser::{CertificateParser, Extraction};

use crate::models::record::Layout;
use rules::RawSubjectMatch;

/// A subject-row family for one certificate layout.
pub trait LayoutStrategy {
    /// Layout this strategy reads.
    fn layout(&self) -> Layout;

    /// Whether the text looks like this layout.
    fn detect(&self, text: &str) -> bool;

    /// All subject matches in the text.
    fn subject_rows(&self, text: &str) -> Vec<RawSubjectMatch>;
}
