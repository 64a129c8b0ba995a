//! Intermediate document model for Word documents.
//!
//! This module defines the data structures that represent a parsed
//! document between the reader and the writer. The formatter restyles
//! these structures in place; anything it does not model is carried
//! through as verbatim XML.

mod document;
mod paragraph;
mod section;

pub use document::*;
pub use paragraph::*;
pub use section::*;
