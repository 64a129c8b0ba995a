//! DOCX (Word) read/write pipeline.
//!
//! Reading streams the main document part of an Office Open XML (.docx)
//! container into the document model. Writing serializes the model back
//! into a complete container, copying every part the model does not
//! cover through byte-for-byte.

mod reader;
mod writer;

pub use reader::DocxReader;
pub use writer::DocxWriter;
