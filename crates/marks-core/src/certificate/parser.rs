//! Certificate parser: scalar rules plus one subject-row strategy per document.

use tracing::{debug, info};

use super::LayoutStrategy;
use super::rules::{
    FieldExtractor, FixedSubjectList, RawSubjectMatch, ScalarRule, TabularRows,
    default_scalar_rules,
};
use crate::error::MarksError;
use crate::models::config::{ExtractionConfig, LayoutChoice};
use crate::models::record::{Layout, ScalarFields};

/// Everything the rules found in one text, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Layout applied to the subject rows.
    pub layout: Layout,
    /// Resolved scalar fields.
    pub scalars: ScalarFields,
    /// Subject matches in the order the strategy produced them.
    pub rows: Vec<RawSubjectMatch>,
}

/// Applies scalar rules and the layout-appropriate subject rule to text.
///
/// Holds only compiled rules; parsing the same text twice gives the same result.
pub struct CertificateParser {
    scalar_rules: Vec<ScalarRule>,
    summary: FixedSubjectList,
    tabular: TabularRows,
    layout: LayoutChoice,
}

impl CertificateParser {
    /// Build a parser from configuration.
    pub fn new(config: &ExtractionConfig) -> Result<Self, MarksError> {
        Ok(Self {
            scalar_rules: default_scalar_rules(),
            summary: FixedSubjectList::new(&config.subjects)?,
            tabular: TabularRows::new(),
            layout: config.layout,
        })
    }

    /// Force a layout instead of detecting it.
    pub fn with_layout(mut self, layout: LayoutChoice) -> Self {
        self.layout = layout;
        self
    }

    /// Strategy for this text. Tabular rows win when any row's marks add up.
    pub fn strategy(&self, text: &str) -> &dyn LayoutStrategy {
        match self.layout {
            LayoutChoice::FixedSubjectList => &self.summary,
            LayoutChoice::TabularRows => &self.tabular,
            LayoutChoice::Auto if self.tabular.detect(text) => &self.tabular,
            LayoutChoice::Auto => &self.summary,
        }
    }

    /// Resolve every scalar field, defaulting to the sentinel.
    pub fn extract_scalars(&self, text: &str) -> ScalarFields {
        let mut scalars = ScalarFields::unknown();
        for rule in &self.scalar_rules {
            if let Some(found) = rule.extract(text) {
                debug!("{} = {:?} (from {:?})", rule.field(), found.value, found.source);
                scalars.set(rule.field(), found.value);
            }
        }
        scalars
    }

    /// Extract scalars and subject rows from document text.
    pub fn extract(&self, text: &str) -> Extraction {
        let strategy = self.strategy(text);
        let layout = strategy.layout();
        let scalars = self.extract_scalars(text);
        let rows = strategy.subject_rows(text);

        info!(
            "Parsed {} chars as {}: {} subject match(es)",
            text.len(),
            layout,
            rows.len()
        );

        Extraction {
            layout,
            scalars,
            rows,
        }
    }
}
