//! PDF processing module.

mod extractor;
mod raster;

pub use extractor::PdfExtractor;

#[cfg(test)]
pub(crate) use extractor::tests::text_pdf;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page-level access to a loaded certificate.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Text layer of every page, in page order. Pages without text are empty strings.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Bitmap of a page (1-indexed) suitable for OCR.
    fn render_page(&self, page: u32) -> Result<DynamicImage>;
}
