//! Role style table: the fixed formatting each paragraph role receives.
//!
//! All values use WordprocessingML units: font sizes in half-points,
//! paragraph spacing in twips, line spacing in 240ths of a line
//! (240 = single, 360 = one-and-a-half).

use crate::classify::Role;
use crate::model::{Alignment, PageMargins, RunStyle};

/// Font applied to every run, for both Latin and East Asian scripts.
pub const FONT_NAME: &str = "Times New Roman";

/// Page margins forced on every section: 1" top/bottom, 1.25"
/// left/right, Word's default header/footer distances.
pub const STANDARD_MARGINS: PageMargins = PageMargins {
    top: 1440,
    bottom: 1440,
    left: 1800,
    right: 1800,
    header: 720,
    footer: 720,
    gutter: 0,
};

/// Formatting for one paragraph role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    /// Font size in half-points
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub alignment: Alignment,
    /// Space before the paragraph in twips
    pub spacing_before: u32,
    /// Space after the paragraph in twips
    pub spacing_after: u32,
    /// Line spacing in 240ths of a line
    pub line_spacing: u32,
    /// The next paragraph starts on a new page
    pub page_break_next: bool,
}

impl StyleSpec {
    /// Centered 16 pt bold underlined; pushes what follows onto a new
    /// page.
    pub const TITLE: StyleSpec = StyleSpec {
        size: 32,
        bold: true,
        italic: false,
        underline: true,
        alignment: Alignment::Center,
        spacing_before: 0,
        spacing_after: 240,
        line_spacing: 240,
        page_break_next: true,
    };

    /// Left-aligned 14 pt bold underlined.
    pub const HEADING: StyleSpec = StyleSpec {
        size: 28,
        bold: true,
        italic: false,
        underline: true,
        alignment: Alignment::Left,
        spacing_before: 240,
        spacing_after: 120,
        line_spacing: 240,
        page_break_next: false,
    };

    /// Centered 10 pt italic.
    pub const CAPTION: StyleSpec = StyleSpec {
        size: 20,
        bold: false,
        italic: true,
        underline: false,
        alignment: Alignment::Center,
        spacing_before: 120,
        spacing_after: 120,
        line_spacing: 240,
        page_break_next: false,
    };

    /// Justified 12 pt at one-and-a-half line spacing.
    pub const BODY: StyleSpec = StyleSpec {
        size: 24,
        bold: false,
        italic: false,
        underline: false,
        alignment: Alignment::Justify,
        spacing_before: 0,
        spacing_after: 0,
        line_spacing: 360,
        page_break_next: false,
    };

    /// The run formatting this row forces onto every run.
    pub fn run_style(&self) -> RunStyle {
        RunStyle {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            font: Some(FONT_NAME.to_string()),
            east_asia_font: Some(FONT_NAME.to_string()),
            size: Some(self.size),
        }
    }
}

/// The full role-to-style mapping used by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSheet {
    pub title: StyleSpec,
    pub heading: StyleSpec,
    pub caption: StyleSpec,
    pub body: StyleSpec,
}

impl StyleSheet {
    /// Look up the style row for a role.
    pub fn for_role(&self, role: Role) -> &StyleSpec {
        match role {
            Role::Title => &self.title,
            Role::Heading => &self.heading,
            Role::Caption => &self.caption,
            Role::Body => &self.body,
        }
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            title: StyleSpec::TITLE,
            heading: StyleSpec::HEADING,
            caption: StyleSpec::CAPTION,
            body: StyleSpec::BODY,
        }
    }
}
