//! Text acquisition: the PDF text layer first, OCR over page images second.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::AcquisitionError;
use crate::models::config::PdfConfig;
use crate::models::record::TextSource;
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Text of one document, page by page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    /// Page texts in page order.
    pub pages: Vec<String>,
    /// How the text was obtained.
    pub source: TextSource,
}

impl RawText {
    /// Pages joined with newlines.
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }

    /// Whether every page is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

/// Produces document text with OCR fallback.
pub struct TextAcquirer {
    ocr: Option<Box<dyn OcrBackend>>,
    config: PdfConfig,
}

impl TextAcquirer {
    /// Text-layer only acquirer.
    pub fn new(config: PdfConfig) -> Self {
        Self { ocr: None, config }
    }

    /// Set the OCR backend used for the fallback.
    pub fn with_ocr(mut self, ocr: Box<dyn OcrBackend>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Whether an OCR fallback is possible.
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some() && self.config.ocr_fallback
    }

    /// Load a PDF from disk and acquire its text.
    pub fn acquire_file(&self, path: &Path) -> Result<RawText, AcquisitionError> {
        info!("Reading {}", path.display());
        let document = PdfExtractor::open(path)?;
        self.acquire(&document)
    }

    /// Acquire text from a loaded document.
    ///
    /// OCR runs only when the text layer failed or is whitespace-only.
    pub fn acquire(&self, document: &dyn PdfProcessor) -> Result<RawText, AcquisitionError> {
        let page_count = document.page_count();
        if page_count == 0 {
            return Err(AcquisitionError::Unreadable(crate::error::PdfError::NoPages));
        }

        match document.extract_page_texts() {
            Ok(pages) => {
                let raw = RawText {
                    pages,
                    source: TextSource::TextLayer,
                };
                if !raw.is_blank() {
                    info!(
                        "Text layer: {} page(s), {} chars",
                        raw.pages.len(),
                        raw.text().len()
                    );
                    return Ok(raw);
                }
                debug!("Text layer is empty on all {} page(s)", page_count);
            }
            Err(e) => warn!("Text layer extraction failed: {}", e),
        }

        self.acquire_ocr(document, page_count)
    }

    fn acquire_ocr(
        &self,
        document: &dyn PdfProcessor,
        page_count: u32,
    ) -> Result<RawText, AcquisitionError> {
        let ocr = match &self.ocr {
            Some(ocr) if self.config.ocr_fallback => ocr,
            _ => return Err(AcquisitionError::OcrUnavailable),
        };

        let last_page = match self.config.max_ocr_pages {
            0 => page_count,
            n => page_count.min(n as u32),
        };

        info!("Falling back to OCR on {} page(s)", last_page);

        let mut pages = Vec::with_capacity(last_page as usize);
        for page in 1..=last_page {
            let text = document
                .render_page(page)
                .map_err(|e| e.to_string())
                .and_then(|img| ocr.recognize(&img).map_err(|e| e.to_string()))
                .unwrap_or_else(|e| {
                    warn!("OCR failed for page {}: {}", page, e);
                    String::new()
                });
            debug!("OCR page {}/{}: {} chars", page, last_page, text.len());
            pages.push(text);
        }

        let raw = RawText {
            pages,
            source: TextSource::Ocr,
        };

        if raw.is_blank() {
            return Err(AcquisitionError::NoText { pages: page_count });
        }

        Ok(raw)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use image::DynamicImage;
    use pretty_assertions::assert_eq;

    use crate::error::{OcrError, PdfError};

    /// In-memory document with fixed page texts.
    pub(crate) struct FakeDocument {
        pub texts: Option<Vec<String>>,
        pub pages: u32,
    }

    impl FakeDocument {
        pub(crate) fn with_text(pages: &[&str]) -> Self {
            Self {
                texts: Some(pages.iter().map(|p| p.to_string()).collect()),
                pages: pages.len() as u32,
            }
        }

        pub(crate) fn scanned(pages: u32) -> Self {
            Self {
                texts: Some(vec![String::new(); pages as usize]),
                pages,
            }
        }
    }

    impl PdfProcessor for FakeDocument {
        fn load(&mut self, _data: &[u8]) -> crate::pdf::Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            self.pages
        }

        fn extract_page_texts(&self) -> crate::pdf::Result<Vec<String>> {
            self.texts
                .clone()
                .ok_or_else(|| PdfError::TextExtraction("broken text layer".to_string()))
        }

        fn render_page(&self, page: u32) -> crate::pdf::Result<DynamicImage> {
            if page > self.pages {
                return Err(PdfError::InvalidPage(page));
            }
            Ok(DynamicImage::new_luma8(page, 1))
        }
    }

    /// OCR stub that reports the page it saw via the image width.
    pub(crate) struct FakeOcr {
        pub calls: Rc<Cell<usize>>,
        pub output: Vec<String>,
    }

    impl FakeOcr {
        pub(crate) fn new(output: &[&str]) -> (Self, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            let ocr = Self {
                calls: calls.clone(),
                output: output.iter().map(|s| s.to_string()).collect(),
            };
            (ocr, calls)
        }
    }

    impl OcrBackend for FakeOcr {
        fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
            self.calls.set(self.calls.get() + 1);
            let page = image.width() as usize;
            self.output
                .get(page - 1)
                .cloned()
                .ok_or_else(|| OcrError::Recognition(format!("no output for page {}", page)))
        }
    }

    #[test]
    fn test_text_layer_skips_ocr() {
        let (ocr, calls) = FakeOcr::new(&["ocr text"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let raw = acquirer
            .acquire(&FakeDocument::with_text(&["Register Number 123", "page two"]))
            .unwrap();

        assert_eq!(raw.source, TextSource::TextLayer);
        assert_eq!(raw.text(), "Register Number 123\npage two");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_empty_text_layer_uses_ocr_in_page_order() {
        let (ocr, calls) = FakeOcr::new(&["first", "second"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let raw = acquirer.acquire(&FakeDocument::scanned(2)).unwrap();

        assert_eq!(raw.source, TextSource::Ocr);
        assert_eq!(raw.text(), "first\nsecond");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_whitespace_text_layer_uses_ocr() {
        let (ocr, calls) = FakeOcr::new(&["scanned"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let raw = acquirer.acquire(&FakeDocument::with_text(&["  \n\t "])).unwrap();
        assert_eq!(raw.text(), "scanned");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_broken_text_layer_uses_ocr() {
        let (ocr, _) = FakeOcr::new(&["from ocr"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));
        let document = FakeDocument {
            texts: None,
            pages: 1,
        };

        let raw = acquirer.acquire(&document).unwrap();
        assert_eq!(raw.source, TextSource::Ocr);
    }

    #[test]
    fn test_failed_ocr_page_is_empty_but_others_survive() {
        let (ocr, calls) = FakeOcr::new(&["only page one"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let raw = acquirer.acquire(&FakeDocument::scanned(2)).unwrap();
        assert_eq!(raw.pages, vec!["only page one".to_string(), String::new()]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_both_empty_fails() {
        let (ocr, _) = FakeOcr::new(&["", "  "]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let err = acquirer.acquire(&FakeDocument::scanned(2)).unwrap_err();
        assert!(matches!(err, AcquisitionError::NoText { pages: 2 }));
    }

    #[test]
    fn test_no_ocr_backend_fails() {
        let acquirer = TextAcquirer::new(PdfConfig::default());
        let err = acquirer.acquire(&FakeDocument::scanned(1)).unwrap_err();
        assert!(matches!(err, AcquisitionError::OcrUnavailable));
    }

    #[test]
    fn test_disabled_fallback_never_calls_ocr() {
        let (ocr, calls) = FakeOcr::new(&["text"]);
        let config = PdfConfig {
            ocr_fallback: false,
            ..PdfConfig::default()
        };
        let acquirer = TextAcquirer::new(config).with_ocr(Box::new(ocr));

        assert!(!acquirer.has_ocr());
        assert!(acquirer.acquire(&FakeDocument::scanned(1)).is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_zero_pages_fails() {
        let acquirer = TextAcquirer::new(PdfConfig::default());
        let document = FakeDocument {
            texts: Some(Vec::new()),
            pages: 0,
        };
        assert!(matches!(
            acquirer.acquire(&document),
            Err(AcquisitionError::Unreadable(PdfError::NoPages))
        ));
    }

    #[test]
    fn test_max_ocr_pages() {
        let (ocr, calls) = FakeOcr::new(&["a", "b", "c"]);
        let config = PdfConfig {
            max_ocr_pages: 2,
            ..PdfConfig::default()
        };
        let acquirer = TextAcquirer::new(config).with_ocr(Box::new(ocr));

        let raw = acquirer.acquire(&FakeDocument::scanned(3)).unwrap();
        assert_eq!(raw.text(), "a\nb");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_text_pdf_file_skips_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certificate.pdf");
        std::fs::write(
            &path,
            crate::pdf::text_pdf(&[&[
                "Register Number 2012345",
                "101 ENGLISH 45 23 68 SIXTY EIGHT A",
            ]]),
        )
        .unwrap();

        let (ocr, calls) = FakeOcr::new(&["never used"]);
        let acquirer = TextAcquirer::new(PdfConfig::default()).with_ocr(Box::new(ocr));

        let raw = acquirer.acquire_file(&path).unwrap();
        assert_eq!(raw.source, TextSource::TextLayer);
        assert_eq!(calls.get(), 0);
        assert!(raw.text().contains("Register Number 2012345"));
        assert!(raw.text().contains("101 ENGLISH 45 23 68 SIXTY EIGHT A"));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let acquirer = TextAcquirer::new(PdfConfig::default());
        let err = acquirer
            .acquire_file(Path::new("/nonexistent/certificate.pdf"))
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Unreadable(_)));
    }
}
