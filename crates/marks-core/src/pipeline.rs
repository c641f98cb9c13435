//! Document to record pipeline: acquisition, extraction, assembly, persistence.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::acquisition::TextAcquirer;
use crate::certificate::{CertificateParser, RecordAssembler};
use crate::error::Result;
use crate::models::config::MarksConfig;
use crate::models::record::{ExtractedRecord, TextSource};
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::sink::{Persisted, RecordSink, persist_record};

/// A record and what was stored for it.
#[derive(Debug, Clone)]
pub struct Processed {
    pub record: ExtractedRecord,
    /// `None` when the record had no subjects.
    pub persisted: Option<Persisted>,
}

/// Runs one document at a time. Holds no per-document state.
pub struct Pipeline {
    acquirer: TextAcquirer,
    parser: CertificateParser,
    assembler: RecordAssembler,
}

impl Pipeline {
    pub fn new(acquirer: TextAcquirer, parser: CertificateParser, assembler: RecordAssembler) -> Self {
        Self {
            acquirer,
            parser,
            assembler,
        }
    }

    /// Build from configuration. OCR is attached separately with [`Pipeline::with_ocr`].
    pub fn from_config(config: &MarksConfig) -> Result<Self> {
        Ok(Self::new(
            TextAcquirer::new(config.pdf.clone()),
            CertificateParser::new(&config.extraction)?,
            RecordAssembler::from_config(&config.extraction),
        ))
    }

    pub fn with_ocr(mut self, ocr: Box<dyn OcrBackend>) -> Self {
        self.acquirer = self.acquirer.with_ocr(ocr);
        self
    }

    /// Extract a record from text that was already acquired.
    pub fn extract_text(&self, text: &str, source: TextSource) -> ExtractedRecord {
        let extraction = self.parser.extract(text);
        self.assembler.assemble(extraction, source)
    }

    /// Run acquisition and extraction on a loaded document.
    pub fn run(&self, document: &dyn PdfProcessor) -> Result<ExtractedRecord> {
        let start = Instant::now();
        let raw = self.acquirer.acquire(document)?;
        let record = self.extract_text(&raw.text(), raw.source);

        info!(
            "Extracted {} subject(s) via {} in {}ms",
            record.subjects.len(),
            record.source.as_str(),
            start.elapsed().as_millis()
        );
        Ok(record)
    }

    /// Run on a PDF file.
    pub fn run_file(&self, path: &Path) -> Result<ExtractedRecord> {
        let document = PdfExtractor::open(path)?;
        self.run(&document)
    }

    /// Run on a document and store the result.
    ///
    /// Acquisition failures return before the sink is touched.
    pub fn run_and_persist(
        &self,
        document: &dyn PdfProcessor,
        sink: &mut dyn RecordSink,
    ) -> Result<Processed> {
        let record = self.run(document)?;
        let persisted = persist_record(sink, &record)?;
        Ok(Processed { record, persisted })
    }
}
