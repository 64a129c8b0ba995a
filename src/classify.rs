//! Paragraph role classification.
//!
//! Assigns one structural role per non-empty paragraph using ordered
//! rule checks. The rules are intentionally position-blind except for a
//! single flag: whether the paragraph is the first in the document with
//! visible text, which gates title eligibility.

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Structural role of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Document title (first non-empty paragraph only)
    Title,
    /// Section heading
    Heading,
    /// Figure or table caption
    Caption,
    /// Running text
    Body,
}

impl Role {
    /// Lowercase label for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Heading => "heading",
            Role::Caption => "caption",
            Role::Body => "body",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assigns a role to each paragraph.
///
/// The formatter walks paragraphs in order and asks its classifier for
/// one role per non-empty paragraph. [`RuleClassifier`] is the built-in
/// implementation; alternative label sources (a model-backed service, a
/// review pass) plug in through this trait.
pub trait Classifier {
    /// Classify paragraph text.
    ///
    /// `is_first_non_empty` is true only for the first paragraph in the
    /// document with visible text.
    fn classify(&self, text: &str, is_first_non_empty: bool) -> Role;
}

/// Maximum title length in characters.
const TITLE_MAX_CHARS: usize = 100;

/// Maximum length for a title that is not all-uppercase.
const TITLE_PLAIN_MAX_CHARS: usize = 80;

/// Maximum length for an all-uppercase heading.
const UPPER_HEADING_MAX_CHARS: usize = 120;

/// Below this length, text without a trailing period is a heading.
const SHORT_HEADING_MAX_CHARS: usize = 50;

/// Section names that mark a heading when the text starts with them.
const SECTION_KEYWORDS: &[&str] = &[
    "abstract",
    "acknowledgement",
    "acknowledgments",
    "appendix",
    "references",
    "bibliography",
    "contents",
    "table of contents",
    "introduction",
    "conclusion",
    "chapter",
    "part",
    "preface",
    "foreword",
    "executive summary",
    "index",
];

/// Rule-based classifier.
///
/// Decision order: caption, then title (first non-empty paragraph
/// only), then heading, then body. The order encodes precedence, so a
/// first paragraph reading "Figure 1: Overview" is a caption even
/// though it would also qualify as a title.
pub struct RuleClassifier {
    numbered: Regex,
    chapter: Regex,
    figure_caption: Regex,
    table_caption: Regex,
}

impl RuleClassifier {
    /// Create a classifier with the built-in rule set.
    pub fn new() -> Self {
        Self {
            // Numbered sections: 1., 1.1, 1.1.1 Results, etc.
            numbered: Regex::new(r"^\d+(\.\d+)*\.?\s+\S").unwrap(),
            chapter: Regex::new(r"(?i)^(?:chapter|part)\s+(?:\d+|[ivxlcdm]+)\b").unwrap(),
            figure_caption: Regex::new(r"(?i)^(?:figure|fig\.?)\s*\d*[.:]?\s*\S").unwrap(),
            table_caption: Regex::new(r"(?i)^table\s*\d*[.:]?\s*\S").unwrap(),
        }
    }

    fn is_caption(&self, text: &str) -> bool {
        self.figure_caption.is_match(text) || self.table_caption.is_match(text)
    }

    fn is_title_like(&self, text: &str) -> bool {
        let len = char_count(text);
        if len > TITLE_MAX_CHARS || self.numbered.is_match(text) {
            return false;
        }
        is_all_uppercase(text) || (len <= TITLE_PLAIN_MAX_CHARS && !text.ends_with('.'))
    }

    fn is_heading_like(&self, text: &str) -> bool {
        if self.numbered.is_match(text) {
            return true;
        }
        if is_all_uppercase(text) && char_count(text) < UPPER_HEADING_MAX_CHARS {
            return true;
        }
        if char_count(text) < SHORT_HEADING_MAX_CHARS && !text.ends_with('.') {
            return true;
        }
        let lower = text.to_lowercase();
        if SECTION_KEYWORDS.iter().any(|kw| lower.starts_with(kw)) {
            return true;
        }
        self.chapter.is_match(text)
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, text: &str, is_first_non_empty: bool) -> Role {
        // Normalize before rule evaluation so composed and decomposed
        // forms of the same text classify identically.
        let text: String = text.trim().nfc().collect();
        if text.is_empty() {
            return Role::Body;
        }

        if self.is_caption(&text) {
            return Role::Caption;
        }
        if is_first_non_empty && self.is_title_like(&text) {
            return Role::Title;
        }
        if self.is_heading_like(&text) {
            return Role::Heading;
        }
        Role::Body
    }
}

/// Character count (Unicode scalar values, not bytes).
fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// True when the text has at least one cased character and none of
/// them is lowercase. Digit-only or punctuation-only text is not
/// uppercase.
fn is_all_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RuleClassifier {
        RuleClassifier::new()
    }

    #[test]
    fn test_numbered_sections_are_headings_anywhere() {
        let c = classifier();
        assert_eq!(c.classify("1. Introduction", true), Role::Heading);
        assert_eq!(c.classify("1. Introduction", false), Role::Heading);
        assert_eq!(c.classify("2.3 Methods", false), Role::Heading);
        assert_eq!(c.classify("2.3.4 Results and Discussion", false), Role::Heading);
        assert_eq!(c.classify("10. Conclusion", false), Role::Heading);
    }

    #[test]
    fn test_numbered_pattern_needs_following_text() {
        let c = classifier();
        // A bare "1." has no section text after it, so the numbered
        // rule does not fire, and its trailing period then rules out
        // the short-line rule too.
        assert_eq!(c.classify("1.", false), Role::Body);
        // Without the period the short-line rules take over.
        assert_eq!(c.classify("1", false), Role::Heading);
        assert_eq!(c.classify("1", true), Role::Title);
    }

    #[test]
    fn test_first_all_caps_is_title_then_heading() {
        let c = classifier();
        // Title takes precedence over the all-caps heading rule for the
        // first non-empty paragraph; the same text later is a heading.
        assert_eq!(c.classify("INTRODUCTION", true), Role::Title);
        assert_eq!(c.classify("INTRODUCTION", false), Role::Heading);
    }

    #[test]
    fn test_all_caps_heading_length_bound() {
        let c = classifier();
        let short_caps = "EXPERIMENTAL SETUP";
        assert_eq!(c.classify(short_caps, false), Role::Heading);

        // 120+ characters of caps no longer qualifies through the
        // all-caps rule, and the trailing period blocks the short rule.
        let long_caps = "A".repeat(125) + " B.";
        assert_eq!(c.classify(&long_caps, false), Role::Body);
    }

    #[test]
    fn test_captions_beat_position_and_length() {
        let c = classifier();
        assert_eq!(
            c.classify("Figure 3: Sample chart showing results.", false),
            Role::Caption
        );
        assert_eq!(c.classify("Table 2. Comparison of methods.", false), Role::Caption);
        assert_eq!(c.classify("Fig. 7 overview", false), Role::Caption);
        assert_eq!(c.classify("figure 1: lowercase still counts", false), Role::Caption);
        // Caption wins over title even for the first paragraph
        assert_eq!(c.classify("Figure 1: Overview", true), Role::Caption);

        let long_caption = format!("Figure 12: {}", "very long caption text ".repeat(20));
        assert_eq!(c.classify(&long_caption, false), Role::Caption);
    }

    #[test]
    fn test_title_requires_first_position() {
        let c = classifier();
        let text = "A Study of Paragraph Classification";
        assert_eq!(c.classify(text, true), Role::Title);
        // Same text later: short-ish but 35 chars, no trailing period,
        // so the short-heading rule applies.
        assert_eq!(c.classify(text, false), Role::Heading);
    }

    #[test]
    fn test_title_length_bounds() {
        let c = classifier();

        // Exactly 80 characters, no trailing period: title when first.
        let at_limit = "x".repeat(79) + "y";
        assert_eq!(char_count(&at_limit), 80);
        assert_eq!(c.classify(&at_limit, true), Role::Title);

        // 81 characters of mixed case: too long for a plain title, and
        // too long for the short-heading rule, so body.
        let over_limit = "x".repeat(80) + "y";
        assert_eq!(c.classify(&over_limit, true), Role::Body);

        // All-caps titles get the larger 100-character allowance.
        let caps = "X".repeat(90);
        assert_eq!(c.classify(&caps, true), Role::Title);
        let caps_over = "X".repeat(101);
        assert_ne!(c.classify(&caps_over, true), Role::Title);
    }

    #[test]
    fn test_numbered_first_paragraph_is_not_title() {
        let c = classifier();
        assert_eq!(c.classify("1. Annual Report", true), Role::Heading);
    }

    #[test]
    fn test_trailing_period_blocks_plain_title() {
        let c = classifier();
        // First paragraph ending in a period is not a title unless all
        // caps; here it falls through to the short-heading rule, which
        // also rejects the period, then the keyword rule misses.
        assert_eq!(c.classify("This document describes the plan.", true), Role::Body);
        // All caps with a trailing period is still a title.
        assert_eq!(c.classify("THE PLAN.", true), Role::Title);
    }

    #[test]
    fn test_short_lines_without_period_are_headings() {
        let c = classifier();
        assert_eq!(c.classify("Overview", false), Role::Heading);
        assert_eq!(c.classify("Results and Discussion", false), Role::Heading);
        // Trailing period turns a short line into running text
        assert_eq!(c.classify("So it goes.", false), Role::Body);
    }

    #[test]
    fn test_section_keywords_match_as_prefix() {
        let c = classifier();
        assert_eq!(c.classify("References", false), Role::Heading);
        // "Table of Contents" starts with "table", so the caption rule
        // claims it before the keyword rule is consulted.
        assert_eq!(c.classify("Table of Contents", false), Role::Caption);
        assert_eq!(c.classify("Executive Summary", false), Role::Heading);
        assert_eq!(c.classify("Acknowledgements", false), Role::Heading);
        assert_eq!(c.classify("Acknowledgments", false), Role::Heading);
        // Keyword with a trailing period is still a heading: the
        // keyword rule has no punctuation requirement.
        assert_eq!(c.classify("Introduction.", false), Role::Heading);
        // Prefix matching holds past the short-line length bound
        assert_eq!(
            c.classify(
                "Appendix A contains the raw measurement data for every configuration.",
                false
            ),
            Role::Heading
        );
    }

    #[test]
    fn test_chapter_and_part_numbering() {
        let c = classifier();
        assert_eq!(
            c.classify("Chapter 12 describes the experimental methodology.", false),
            Role::Heading
        );
        assert_eq!(c.classify("Chapter IV: Results", false), Role::Heading);
        assert_eq!(c.classify("part iii", false), Role::Heading);
        assert_eq!(c.classify("PART 2: THE LONG ROAD HOME", false), Role::Heading);
    }

    #[test]
    fn test_body_fallback() {
        let c = classifier();
        let para = "The measurements were repeated three times under identical conditions, \
                    and the mean value was recorded for each configuration.";
        assert_eq!(c.classify(para, false), Role::Body);
        assert_eq!(c.classify(para, true), Role::Body);
    }

    #[test]
    fn test_uppercase_detection() {
        assert!(is_all_uppercase("HELLO WORLD"));
        assert!(is_all_uppercase("HELLO 123!"));
        assert!(!is_all_uppercase("Hello World"));
        assert!(!is_all_uppercase("123 456"));
        assert!(!is_all_uppercase("..."));
        assert!(is_all_uppercase("CAFÉ"));
    }

    #[test]
    fn test_unicode_normalization_and_char_counts() {
        let c = classifier();
        // Decomposed accents normalize before rules run, so both forms
        // of the same title classify identically.
        let composed = "R\u{c9}SUM\u{c9}";
        let decomposed = "RE\u{301}SUME\u{301}";
        assert_eq!(c.classify(composed, true), c.classify(decomposed, true));

        // Multibyte characters count as one character each.
        let korean = "초록"; // "abstract", 2 characters
        assert_eq!(c.classify(korean, false), Role::Heading);
    }

    #[test]
    fn test_whitespace_only_degrades_to_body() {
        let c = classifier();
        assert_eq!(c.classify("   \t  ", true), Role::Body);
        assert_eq!(c.classify("", false), Role::Body);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Title.as_str(), "title");
        assert_eq!(Role::Caption.to_string(), "caption");
        assert_eq!(serde_json::to_string(&Role::Heading).unwrap(), "\"heading\"");
    }
}
