//! Paragraph, run, and paragraph-property models.

use super::Section;
use serde::{Deserialize, Serialize};

/// Paragraph alignment (`w:jc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// The `w:jc` attribute value for this alignment.
    pub fn as_wml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    /// Parse a `w:jc` attribute value.
    ///
    /// "both" and "distribute" both render as justified text.
    pub fn from_wml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Character-level formatting for a run (`w:rPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Italic text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Underlined text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    /// Font name for Latin script (`w:rFonts w:ascii`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    /// Font name for East Asian script (`w:rFonts w:eastAsia`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east_asia_font: Option<String>,

    /// Font size in half-points (e.g., 24 = 12pt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl RunStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the style carries any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.font.is_some()
            || self.east_asia_font.is_some()
            || self.size.is_some()
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Character styling
    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: RunStyle,

    /// Hyperlink target, resolved from the part relationships
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,

    /// Relationship ID of the enclosing `w:hyperlink`, kept so the run
    /// can be re-wrapped on write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink_id: Option<String>,

    /// Unmodeled run children (drawings, footnote references, symbols),
    /// re-emitted verbatim on write
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_xml: String,
}

fn is_default_style(style: &RunStyle) -> bool {
    *style == RunStyle::default()
}

impl Run {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
            ..Default::default()
        }
    }

    /// Create a hyperlink text run.
    pub fn link(
        text: impl Into<String>,
        target: impl Into<String>,
        rel_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            hyperlink: Some(target.into()),
            hyperlink_id: Some(rel_id.into()),
            ..Default::default()
        }
    }

    /// Check if this run is a hyperlink.
    pub fn is_link(&self) -> bool {
        self.hyperlink_id.is_some()
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Paragraph-level formatting (`w:pPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Alignment (`w:jc`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    /// Space before the paragraph in twips (`w:spacing w:before`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_before: Option<u32>,

    /// Space after the paragraph in twips (`w:spacing w:after`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_after: Option<u32>,

    /// Line spacing in 240ths of a line (`w:spacing w:line`, 240 = single)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<u32>,

    /// Start this paragraph on a new page (`w:pageBreakBefore`)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub page_break_before: bool,

    /// Section properties carried by this paragraph (`w:sectPr` inside
    /// `w:pPr`), ending a section mid-document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,

    /// Unmodeled `w:pPr` children (style refs, numbering, indents),
    /// re-emitted verbatim on write
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_xml: String,
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in this paragraph
    #[serde(default)]
    pub runs: Vec<Run>,

    /// Paragraph-level formatting
    #[serde(default, skip_serializing_if = "is_default_properties")]
    pub properties: ParagraphProperties,
}

fn is_default_properties(props: &ParagraphProperties) -> bool {
    *props == ParagraphProperties::default()
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            ..Default::default()
        }
    }

    /// Add a text run to this paragraph.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph has no visible content.
    ///
    /// Runs carrying unmodeled XML (a drawing, a footnote reference)
    /// count as content even when they hold no text.
    pub fn is_empty(&self) -> bool {
        self.runs
            .iter()
            .all(|r| r.text.trim().is_empty() && r.extra_xml.is_empty())
    }

    /// Check if this paragraph ends a section.
    pub fn has_section_break(&self) -> bool {
        self.properties.section.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_wml_values() {
        assert_eq!(Alignment::Justify.as_wml(), "both");
        assert_eq!(Alignment::Center.as_wml(), "center");
        assert_eq!(Alignment::from_wml("both"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_wml("distribute"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_wml("start"), Some(Alignment::Left));
        assert_eq!(Alignment::from_wml("banana"), None);
    }

    #[test]
    fn test_run() {
        let plain = Run::plain("Hello");
        assert_eq!(plain.text, "Hello");
        assert!(!plain.is_link());

        let link = Run::link("Click here", "https://example.com", "rId4");
        assert!(link.is_link());
        assert_eq!(link.hyperlink.as_deref(), Some("https://example.com"));
        assert_eq!(link.hyperlink_id.as_deref(), Some("rId4"));
    }

    #[test]
    fn test_run_style() {
        let style = RunStyle {
            bold: true,
            ..Default::default()
        };
        assert!(style.has_formatting());
        assert!(!RunStyle::default().has_formatting());

        let sized = RunStyle {
            size: Some(24),
            ..Default::default()
        };
        assert!(sized.has_formatting());
    }

    #[test]
    fn test_paragraph_text() {
        let para = Paragraph::with_text("Hello, World!");
        assert_eq!(para.plain_text(), "Hello, World!");
        assert!(!para.is_empty());

        let mut multi = Paragraph::new();
        multi.add_run(Run::plain("Hello, "));
        multi.add_run(Run::styled(
            "World",
            RunStyle {
                bold: true,
                ..Default::default()
            },
        ));
        assert_eq!(multi.plain_text(), "Hello, World");
    }

    #[test]
    fn test_paragraph_emptiness() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   \t ").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());

        // A textless run holding a drawing still counts as content
        let mut drawing = Paragraph::new();
        drawing.add_run(Run {
            extra_xml: "<w:drawing/>".to_string(),
            ..Default::default()
        });
        assert!(!drawing.is_empty());
    }

    #[test]
    fn test_paragraph_serialization() {
        let para = Paragraph::with_text("Test");
        let json = serde_json::to_string(&para).unwrap();
        // Default values should not be serialized
        assert!(!json.contains("properties"));
        assert!(!json.contains("hyperlink"));

        let mut styled = Paragraph::with_text("Test");
        styled.properties.alignment = Some(Alignment::Justify);
        let json = serde_json::to_string(&styled).unwrap();
        assert!(json.contains("\"alignment\":\"justify\""));
    }
}
