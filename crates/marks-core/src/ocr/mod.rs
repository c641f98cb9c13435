//! OCR over page bitmaps.
//!
//! The recognizer itself is a black box behind [`OcrBackend`]; this module
//! only turns its text boxes into reading-order lines.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Anything that can turn a page image into text.
pub trait OcrBackend {
    /// Recognize the text of one page.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    fn center_y(&self) -> f32 {
        let (_, min_y, _, max_y) = self.rect();
        (min_y + max_y) / 2.0
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text: boxes on one line joined by spaces, lines by newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes.
    ///
    /// Boxes whose vertical centers lie within `line_tolerance` pixels of the
    /// line's first box are treated as one line, so a mark-sheet row comes out
    /// as a single line of text.
    pub fn from_boxes(
        mut boxes: Vec<TextBox>,
        line_tolerance: f32,
        image_size: (u32, u32),
        processing_time_ms: u64,
    ) -> Self {
        boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

        let mut lines: Vec<Vec<TextBox>> = Vec::new();
        for text_box in boxes {
            let starts_line = lines.last().is_none_or(|line| {
                (text_box.center_y() - line[0].center_y()).abs() > line_tolerance
            });

            if starts_line {
                lines.push(vec![text_box]);
            } else if let Some(line) = lines.last_mut() {
                line.push(text_box);
            }
        }

        for line in &mut lines {
            line.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
        }

        let text = lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|b| b.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes: lines.into_iter().flatten().collect(),
            text,
            processing_time_ms,
            image_size,
        }
    }
}
