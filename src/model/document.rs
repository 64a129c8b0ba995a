//! Document model structures.

use super::{Paragraph, Section};
use serde::{Deserialize, Serialize};

/// Document metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Document description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords/tags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// Last modified by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// A body-level content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// Any other body element (tables, content controls, bookmarks),
    /// carried through untouched
    Raw { xml: String },
}

impl Block {
    /// View this block as a paragraph, if it is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(para) => Some(para),
            _ => None,
        }
    }

    /// Mutable paragraph view.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(para) => Some(para),
            _ => None,
        }
    }
}

/// A parsed Word document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Attributes captured from the `w:document` root element, verbatim.
    /// Keeping them intact preserves the namespace declarations that
    /// raw-carried chunks rely on.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_attrs: String,

    /// Body content in document order
    #[serde(default)]
    pub body: Vec<Block>,

    /// Trailing body section properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a paragraph to the body.
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.body.push(Block::Paragraph(para));
    }

    /// Iterate over the body's paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(Block::as_paragraph)
    }

    /// Iterate mutably over the body's paragraphs.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(Block::as_paragraph_mut)
    }

    /// Number of paragraphs in the body.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Iterate mutably over every section in the document: those carried
    /// by paragraphs, then the trailing body section.
    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        let para_sections = self
            .body
            .iter_mut()
            .filter_map(Block::as_paragraph_mut)
            .filter_map(|p| p.properties.section.as_mut());
        para_sections.chain(self.section.as_mut())
    }

    /// Check if the document has no body content.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Extract all paragraph text as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for para in self.paragraphs() {
            text.push_str(&para.plain_text());
            text.push('\n');
        }
        text.trim().to_string()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to JSON string (compact).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
