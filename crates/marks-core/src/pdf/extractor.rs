//! PDF text layer and page image access using lopdf and pdf-extract.

use image::DynamicImage;
use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result, raster};
use crate::error::PdfError;

/// Certificate PDF loaded in memory.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Read and load a PDF file.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        let mut extractor = Self::new();
        extractor.load(&data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Per-page text through lopdf's own content stream decoder.
    fn lopdf_page_texts(&self) -> Result<Vec<String>> {
        let doc = self.document()?;
        let texts = doc
            .get_pages()
            .keys()
            .map(|&page| doc.extract_text(&[page]).unwrap_or_default())
            .collect();
        Ok(texts)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.document()?;

        match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(pages) => Ok(pages),
            Err(e) => {
                warn!("pdf-extract failed ({}), retrying with lopdf", e);
                self.lopdf_page_texts()
                    .map_err(|_| PdfError::TextExtraction(e.to_string()))
            }
        }
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        if let Some(img) = raster::largest(raster::page_images(doc, *page_id)) {
            debug!("Page {} image: {}x{}", page, img.width(), img.height());
            return Ok(img);
        }

        // Images nested in form XObjects are not reachable from the page resources
        debug!("No image XObject on page {}, scanning all objects", page);
        raster::document_images(doc)
            .into_iter()
            .nth((page - 1) as usize)
            .ok_or_else(|| PdfError::ImageExtraction(format!("no image found for page {}", page)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// PDF with a Courier text layer, one inner slice of lines per page.
    pub(crate) fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![40.into(), 760.into()]),
            ];
            for line in lines.iter() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    /// One-page PDF whose only content is a 2x2 gray image.
    fn scanned_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0, 255, 255, 0],
        ));
        let resources_id = doc.add_object(dictionary! {
            "XObject" => dictionary! { "Im1" => image_id },
        });
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"q 2 0 0 2 0 0 cm /Im1 Do Q".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 2.into(), 2.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_unloaded_extractor_errors() {
        let extractor = PdfExtractor::new();
        assert!(extractor.extract_page_texts().is_err());
        assert!(extractor.render_page(1).is_err());
    }

    #[test]
    fn test_text_layer_by_page() {
        let mut extractor = PdfExtractor::new();
        extractor
            .load(&text_pdf(&[
                &["Register Number 2012345"],
                &["101 ENGLISH 45 23 68 SIXTY EIGHT A"],
            ]))
            .unwrap();
        assert_eq!(extractor.page_count(), 2);

        let texts = extractor.extract_page_texts().unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("Register Number 2012345"), "{:?}", texts);
        assert!(texts[1].contains("101 ENGLISH 45 23 68 SIXTY EIGHT A"), "{:?}", texts);
        assert!(!texts[0].contains("ENGLISH"));
    }

    #[test]
    fn test_lopdf_text_fallback_by_page() {
        let mut extractor = PdfExtractor::new();
        extractor
            .load(&text_pdf(&[&["Register Number 2012345"], &["PHYSICS 078 B+"]]))
            .unwrap();

        let texts = extractor.lopdf_page_texts().unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("Register Number 2012345"), "{:?}", texts);
        assert!(texts[1].contains("PHYSICS 078 B+"), "{:?}", texts);
    }

    #[test]
    fn test_scanned_page_has_blank_text_layer() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&scanned_pdf()).unwrap();
        let texts = extractor.extract_page_texts().unwrap();
        assert!(texts.iter().all(|t| t.trim().is_empty()), "{:?}", texts);
    }

    #[test]
    fn test_render_scanned_page() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&scanned_pdf()).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let img = extractor.render_page(1).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
    }

    #[test]
    fn test_render_invalid_page() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&scanned_pdf()).unwrap();
        assert!(matches!(
            extractor.render_page(3),
            Err(PdfError::InvalidPage(3))
        ));
    }
}
