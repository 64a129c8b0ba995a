//! Document formatting pipeline.
//!
//! Walks the paragraphs of a parsed document, assigns each one a
//! structural role, and rewrites paragraph and run formatting to the
//! configured style sheet. Empty paragraphs are deleted, page margins
//! are normalized on every section, and a page break is inserted after
//! the document title.

use crate::classify::{Classifier, Role, RuleClassifier};
use crate::detect;
use crate::docx::{DocxReader, DocxWriter};
use crate::error::{Error, Result};
use crate::model::{Block, Document, PageMargins, Paragraph, Section};
use crate::style::{StyleSheet, StyleSpec, STANDARD_MARGINS};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Label preview length in characters.
const PREVIEW_CHARS: usize = 150;

/// Options controlling the formatting pass.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Styles applied per role
    pub styles: StyleSheet,
    /// Page margins forced onto every section
    pub margins: PageMargins,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            styles: StyleSheet::default(),
            margins: STANDARD_MARGINS,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the style sheet.
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    /// Set the page margins.
    pub fn with_margins(mut self, margins: PageMargins) -> Self {
        self.margins = margins;
        self
    }
}

/// Per-role paragraph counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub title: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub heading: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub caption: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub body: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl RoleCounts {
    pub fn record(&mut self, role: Role) {
        match role {
            Role::Title => self.title += 1,
            Role::Heading => self.heading += 1,
            Role::Caption => self.caption += 1,
            Role::Body => self.body += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.title + self.heading + self.caption + self.body
    }
}

/// Result of a formatting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSummary {
    /// Paragraphs remaining after the pass
    pub paragraphs: usize,
    /// Empty paragraphs deleted
    pub removed_empty: usize,
    /// Classified paragraphs per role
    pub counts: RoleCounts,
}

/// One classified paragraph in a label report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphLabel {
    /// Position among the non-empty paragraphs
    pub index: usize,
    /// Up to 150 characters of text
    pub text_preview: String,
    /// Assigned role
    pub role: Role,
}

/// Classification report for a document, without modifying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelReport {
    pub paragraphs: Vec<ParagraphLabel>,
    pub summary: RoleCounts,
}

impl LabelReport {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidData(e.to_string()))
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Document formatter.
///
/// # Example
///
/// ```no_run
/// use docfmt::Formatter;
///
/// let formatter = Formatter::new();
/// let summary = formatter.format_file("report.docx", "formatted_report.docx")?;
/// println!("{} paragraphs formatted", summary.paragraphs);
/// # Ok::<(), docfmt::Error>(())
/// ```
pub struct Formatter {
    options: FormatOptions,
    classifier: Box<dyn Classifier + Send + Sync>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            options: FormatOptions::default(),
            classifier: Box::new(RuleClassifier::new()),
        }
    }
}

impl Formatter {
    /// Create a formatter with default options and the rule-based
    /// classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with the given options.
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn Classifier + Send + Sync>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Format a document in place.
    ///
    /// Deletes empty paragraphs, classifies the rest, applies the
    /// configured styles, and forces page margins onto every section.
    /// Paragraphs that carry content but no text (a lone drawing, a
    /// section break holder) keep their place in the flow without being
    /// classified.
    pub fn format_document(&self, doc: &mut Document) -> FormatSummary {
        let mut removed_empty = 0;
        doc.body.retain(|block| match block {
            Block::Paragraph(para) => {
                if para.is_empty() && !para.has_section_break() {
                    removed_empty += 1;
                    false
                } else {
                    true
                }
            }
            _ => true,
        });

        let mut counts = RoleCounts::default();
        let mut paragraphs = 0;
        let mut seen_first = false;
        let mut pending_page_break = false;

        for block in &mut doc.body {
            let Some(para) = block.as_paragraph_mut() else {
                continue;
            };
            paragraphs += 1;

            let text = para.plain_text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                if pending_page_break {
                    para.properties.page_break_before = true;
                    pending_page_break = false;
                }
                continue;
            }

            let role = self.classifier.classify(trimmed, !seen_first);
            seen_first = true;
            counts.record(role);

            let spec = self.options.styles.for_role(role);
            apply_spec(para, spec);
            if pending_page_break {
                para.properties.page_break_before = true;
            }
            pending_page_break = spec.page_break_next;
        }

        self.apply_margins(doc);

        FormatSummary {
            paragraphs,
            removed_empty,
            counts,
        }
    }

    /// Classify every non-empty paragraph without modifying the
    /// document.
    pub fn label_document(&self, doc: &Document) -> LabelReport {
        let mut labels = Vec::new();
        let mut counts = RoleCounts::default();
        let mut seen_first = false;

        for para in doc.paragraphs() {
            let text = para.plain_text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            let role = self.classifier.classify(trimmed, !seen_first);
            seen_first = true;
            counts.record(role);
            labels.push(ParagraphLabel {
                index: labels.len(),
                text_preview: preview(trimmed),
                role,
            });
        }

        LabelReport {
            paragraphs: labels,
            summary: counts,
        }
    }

    /// Format DOCX bytes, returning the rewritten container and a
    /// summary.
    pub fn format_bytes(&self, data: Vec<u8>) -> Result<(Vec<u8>, FormatSummary)> {
        detect::ensure_docx(&data)?;
        let reader = DocxReader::from_bytes(data)?;
        let mut doc = reader.parse()?;
        let summary = self.format_document(&mut doc);
        let bytes = DocxWriter::new(&doc).to_bytes_with_source(reader.container())?;
        Ok((bytes, summary))
    }

    /// Format a DOCX file, writing the result to `output`.
    pub fn format_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<FormatSummary> {
        let data = std::fs::read(input)?;
        let (bytes, summary) = self.format_bytes(data)?;
        std::fs::write(output.as_ref(), bytes).map_err(|e| Error::save(output.as_ref(), e))?;
        Ok(summary)
    }

    /// Classify DOCX bytes without modifying them.
    pub fn label_bytes(&self, data: Vec<u8>) -> Result<LabelReport> {
        detect::ensure_docx(&data)?;
        let doc = DocxReader::from_bytes(data)?.parse()?;
        Ok(self.label_document(&doc))
    }

    /// Classify a DOCX file without modifying it.
    pub fn label_file(&self, path: impl AsRef<Path>) -> Result<LabelReport> {
        let data = std::fs::read(path)?;
        self.label_bytes(data)
    }

    /// Format a DOCX file asynchronously.
    #[cfg(feature = "async")]
    pub async fn format_file_async(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<FormatSummary> {
        let data = tokio::fs::read(input).await?;
        let (bytes, summary) = self.format_bytes(data)?;
        tokio::fs::write(output.as_ref(), bytes)
            .await
            .map_err(|e| Error::save(output.as_ref(), e))?;
        Ok(summary)
    }

    /// Classify a DOCX file asynchronously.
    #[cfg(feature = "async")]
    pub async fn label_file_async(&self, path: impl AsRef<Path>) -> Result<LabelReport> {
        let data = tokio::fs::read(path).await?;
        self.label_bytes(data)
    }

    /// Force the configured margins onto every section, creating a
    /// trailing section when the document has none.
    fn apply_margins(&self, doc: &mut Document) {
        let has_section = doc.section.is_some()
            || doc.paragraphs().any(|p| p.properties.section.is_some());
        if !has_section {
            doc.section = Some(Section::new());
        }
        let margins = self.options.margins;
        for section in doc.sections_mut() {
            section.force_margins(&margins);
        }
    }
}

/// Overwrite paragraph and run formatting with a style spec.
///
/// The replacement is total: every run in the paragraph ends up with
/// the row's formatting, both the Latin and the East Asian font fields
/// included, discarding whatever the source document carried.
fn apply_spec(para: &mut Paragraph, spec: &StyleSpec) {
    para.properties.alignment = Some(spec.alignment);
    para.properties.spacing_before = Some(spec.spacing_before);
    para.properties.spacing_after = Some(spec.spacing_after);
    para.properties.line_spacing = Some(spec.line_spacing);

    let style = spec.run_style();
    for run in &mut para.runs {
        run.style = style.clone();
    }
}
