//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the marks pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarksConfig {
    /// PDF text acquisition configuration.
    pub pdf: PdfConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Storage configuration.
    pub database: DatabaseConfig,
}

/// PDF text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Run OCR on page images when the text layer is empty.
    pub ocr_fallback: bool,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_ocr_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            ocr_fallback: true,
            max_ocr_pages: 0,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,

    /// Vertical distance (pixels) under which two text boxes share a line.
    pub line_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            line_tolerance: 20.0,
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Full path of a model file inside `model_dir`.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}

/// Which subject-row layout to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutChoice {
    /// Detect per document.
    #[default]
    Auto,
    /// Always use the fixed subject vocabulary.
    FixedSubjectList,
    /// Always use tabular rows.
    TabularRows,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Layout selection.
    pub layout: LayoutChoice,

    /// Subject labels searched for on summary certificates.
    pub subjects: Vec<String>,

    /// Tabular rows whose subject name contains one of these are dropped.
    pub excluded_subjects: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            layout: LayoutChoice::Auto,
            subjects: default_subjects(),
            excluded_subjects: vec!["HINDI".to_string()],
        }
    }
}

/// Subject vocabulary of the state board summary certificate.
pub fn default_subjects() -> Vec<String> {
    [
        "ENGLISH",
        "HINDI",
        "PHYSICS",
        "CHEMISTRY",
        "COMPUTER SCIENCE",
        "MATHEMATICS-SCI",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,

    /// Persist records after extraction.
    pub enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("student_marks.sqlite"),
            enabled: true,
        }
    }
}

impl MarksConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
