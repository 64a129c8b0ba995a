//! Error types for the docfmt library.

use std::io;
use thiserror::Error;

/// Result type alias for docfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during document processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The document is encrypted and cannot be processed.
    #[error("Document is encrypted")]
    Encrypted,

    /// The formatted document could not be written.
    #[error("Save error for {path}: {message}")]
    Save { path: String, message: String },
}

impl Error {
    /// Whether this error belongs to the save side of the pipeline.
    pub fn is_save_error(&self) -> bool {
        matches!(self, Error::Save { .. })
    }

    /// Whether this error belongs to the load side of the pipeline.
    ///
    /// Every error that is not a save error comes from opening or
    /// parsing the input document.
    pub fn is_load_error(&self) -> bool {
        !self.is_save_error()
    }

    pub(crate) fn save<P: AsRef<std::path::Path>>(path: P, err: io::Error) -> Self {
        Error::Save {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
