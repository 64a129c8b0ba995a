//! # docfmt
//!
//! Automatic formatting for Microsoft Word documents.
//!
//! This library parses DOCX files, classifies every paragraph by its
//! structural role (title, heading, caption, body), and rewrites the
//! document with consistent fonts, spacing, alignment and page margins.
//! Everything the formatter does not touch (tables, images, styles,
//! headers and footers) is carried through byte-for-byte.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfmt::{format_file, label_file};
//!
//! // Reformat a document
//! let summary = format_file("report.docx", "formatted_report.docx")?;
//! println!(
//!     "{} paragraphs formatted, {} empty removed",
//!     summary.paragraphs, summary.removed_empty
//! );
//!
//! // Inspect classification without modifying the file
//! let report = label_file("report.docx")?;
//! for label in &report.paragraphs {
//!     println!("[{}] {}", label.role.as_str(), label.text_preview);
//! }
//! # Ok::<(), docfmt::Error>(())
//! ```
//!
//! ## Custom Styles
//!
//! ```no_run
//! use docfmt::{FormatOptions, Formatter, PageMargins};
//!
//! let options = FormatOptions::new()
//!     .with_margins(PageMargins::from_inches(1.0, 1.0, 1.0, 1.0));
//! let formatter = Formatter::with_options(options);
//! formatter.format_file("thesis.docx", "formatted_thesis.docx")?;
//! # Ok::<(), docfmt::Error>(())
//! ```
//!
//! ## Features
//!
//! - `docx` (default): Word document support
//! - `async`: Async I/O support with Tokio

pub mod classify;
pub mod container;
pub mod detect;
pub mod error;
pub mod model;
pub mod style;

#[cfg(feature = "docx")]
pub mod docx;

#[cfg(feature = "docx")]
pub mod format;

// Re-exports
pub use classify::{Classifier, Role, RuleClassifier};
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, Metadata, PageMargins, Paragraph, ParagraphProperties, Run,
    RunStyle, Section,
};
pub use style::{StyleSheet, StyleSpec, FONT_NAME, STANDARD_MARGINS};

#[cfg(feature = "docx")]
pub use format::{
    FormatOptions, FormatSummary, Formatter, LabelReport, ParagraphLabel, RoleCounts,
};

use std::path::Path;

/// Format a DOCX file with the default options.
///
/// The output is a complete copy of the input container with the main
/// document part rewritten.
///
/// # Example
///
/// ```no_run
/// use docfmt::format_file;
///
/// let summary = format_file("report.docx", "formatted_report.docx")?;
/// println!("{} paragraphs", summary.paragraphs);
/// # Ok::<(), docfmt::Error>(())
/// ```
#[cfg(feature = "docx")]
pub fn format_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<FormatSummary> {
    Formatter::new().format_file(input, output)
}

/// Format DOCX bytes with the default options.
///
/// # Example
///
/// ```no_run
/// use docfmt::format_bytes;
///
/// let data = std::fs::read("report.docx")?;
/// let (formatted, summary) = format_bytes(data)?;
/// std::fs::write("formatted_report.docx", formatted)?;
/// # Ok::<(), docfmt::Error>(())
/// ```
#[cfg(feature = "docx")]
pub fn format_bytes(data: Vec<u8>) -> Result<(Vec<u8>, FormatSummary)> {
    Formatter::new().format_bytes(data)
}

/// Classify the paragraphs of a DOCX file without modifying it.
///
/// # Example
///
/// ```no_run
/// use docfmt::label_file;
///
/// let report = label_file("report.docx")?;
/// for label in &report.paragraphs {
///     println!("{:>3} [{}] {}", label.index, label.role.as_str(), label.text_preview);
/// }
/// # Ok::<(), docfmt::Error>(())
/// ```
#[cfg(feature = "docx")]
pub fn label_file(path: impl AsRef<Path>) -> Result<LabelReport> {
    Formatter::new().label_file(path)
}

/// Classify the paragraphs of DOCX bytes without modifying them.
#[cfg(feature = "docx")]
pub fn label_bytes(data: Vec<u8>) -> Result<LabelReport> {
    Formatter::new().label_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "docx")]
    #[test]
    fn test_format_bytes_end_to_end() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("PROJECT PLAN"));
        doc.add_paragraph(Paragraph::with_text(""));
        doc.add_paragraph(Paragraph::with_text("A short body paragraph."));
        let bytes = docx::DocxWriter::new(&doc).to_bytes().unwrap();

        let (out, summary) = format_bytes(bytes).unwrap();
        assert_eq!(summary.counts.title, 1);
        assert_eq!(summary.counts.body, 1);
        assert_eq!(summary.removed_empty, 1);

        let formatted = docx::DocxReader::from_bytes(out).unwrap().parse().unwrap();
        assert_eq!(formatted.paragraph_count(), 2);
        let title = formatted.paragraphs().next().unwrap();
        assert_eq!(title.plain_text(), "PROJECT PLAN");
        assert!(title.runs[0].style.bold);
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_label_bytes_end_to_end() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("PROJECT PLAN"));
        doc.add_paragraph(Paragraph::with_text("Overview"));
        let bytes = docx::DocxWriter::new(&doc).to_bytes().unwrap();

        let report = label_bytes(bytes).unwrap();
        assert_eq!(report.paragraphs.len(), 2);
        assert_eq!(report.paragraphs[0].role, Role::Title);
        assert_eq!(report.paragraphs[1].role, Role::Heading);
    }

    #[test]
    fn test_format_detection_rejects_unknown() {
        let err = detect_format_from_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
