//! Core library for student mark-sheet extraction.
//!
//! This crate provides:
//! - PDF processing (text layer and embedded page images)
//! - OCR fallback for scanned certificates
//! - Rule-based field extraction for summary and tabular mark-sheets
//! - Record assembly and relational persistence

pub mod acquisition;
pub mod certificate;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod sink;

pub use acquisition::{RawText, TextAcquirer};
pub use certificate::{CertificateParser, Extraction, LayoutStrategy, RecordAssembler};
pub use error::{MarksError, Result};
pub use models::config::{LayoutChoice, MarksConfig};
pub use models::record::{
    ExtractedRecord, FieldName, Layout, ScalarFields, SubjectRecord, TextSource, UNKNOWN,
};
pub use ocr::{OcrBackend, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{Pipeline, Processed};
pub use sink::{Persisted, RecordSink, SqliteSink, SubjectInsertReport, persist_record};
