//! Error types for the marks-core library.

use thiserror::Error;

/// Main error type for the marks library.
#[derive(Error, Debug)]
pub enum MarksError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Neither the text layer nor OCR produced any text.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Storage sink error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to decode page images.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Reasons a document yielded no readable text.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The document could not be opened at all.
    #[error("document unreadable: {0}")]
    Unreadable(#[from] PdfError),

    /// The text layer was empty and no OCR backend is available.
    #[error("text layer is empty and OCR is unavailable")]
    OcrUnavailable,

    /// Both the text layer and OCR came back empty.
    #[error("no text found in {pages} page(s) by text layer or OCR")]
    NoText { pages: u32 },
}

/// Errors reported by a record sink.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The sink refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Result type for the marks library.
pub type Result<T> = std::result::Result<T, MarksError>;
