//! Section and page-geometry models.

use serde::{Deserialize, Serialize};

/// Twips per inch (twentieths of a point, 72 points per inch).
pub const TWIPS_PER_INCH: u32 = 1440;

/// Page margins in twips (`w:pgMar`).
///
/// Top and bottom are signed: WordprocessingML allows negative values
/// there to pull content into the header/footer area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: i32,
    pub bottom: i32,
    pub left: u32,
    pub right: u32,
    pub header: u32,
    pub footer: u32,
    pub gutter: u32,
}

impl Default for PageMargins {
    /// Word's defaults: 1" margins, 0.5" header/footer distance.
    fn default() -> Self {
        Self {
            top: 1440,
            bottom: 1440,
            left: 1440,
            right: 1440,
            header: 720,
            footer: 720,
            gutter: 0,
        }
    }
}

impl PageMargins {
    /// Build margins from inch values, keeping default header/footer
    /// distances.
    pub fn from_inches(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        let twips = |inches: f64| (inches * TWIPS_PER_INCH as f64).round();
        Self {
            top: twips(top) as i32,
            bottom: twips(bottom) as i32,
            left: twips(left) as u32,
            right: twips(right) as u32,
            ..Default::default()
        }
    }
}

/// `w:sectPr` children that the CT_SectPr sequence places before
/// `w:pgMar`.
const PRECEDES_PGMAR: &[&str] = &[
    "headerReference",
    "footerReference",
    "footnotePr",
    "endnotePr",
    "type",
    "pgSz",
];

/// Whether a `w:sectPr` child element belongs before `w:pgMar`.
pub(crate) fn precedes_pgmar(local_name: &str) -> bool {
    PRECEDES_PGMAR.contains(&local_name)
}

/// A document section (`w:sectPr`): page margins plus whatever other
/// section settings the source carried, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Attributes on the `w:sectPr` element itself, verbatim
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub attrs: String,

    /// Children preceding `w:pgMar` in schema order (header references,
    /// page size), verbatim XML
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix_xml: String,

    /// Page margins (`w:pgMar`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<PageMargins>,

    /// Children following `w:pgMar` (columns, page numbering), verbatim
    /// XML
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix_xml: String,
}

impl Section {
    /// Create a new empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a section with the given margins.
    pub fn with_margins(margins: PageMargins) -> Self {
        Self {
            margins: Some(margins),
            ..Default::default()
        }
    }

    /// Overwrite the four page margins with the given values.
    ///
    /// Header, footer, and gutter distances already present in the
    /// section are left alone; a section without margins gets the full
    /// set including the defaults for those three.
    pub fn force_margins(&mut self, margins: &PageMargins) {
        match &mut self.margins {
            Some(existing) => {
                existing.top = margins.top;
                existing.bottom = margins.bottom;
                existing.left = margins.left;
                existing.right = margins.right;
            }
            None => self.margins = Some(*margins),
        }
    }
}
