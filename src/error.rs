//! Error types for docx2xml.

use thiserror::Error;

/// Result type for docx2xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting or annotating a DOCX package.
#[derive(Error, Debug)]
pub enum Error {
    /// Error occurred while parsing a part of the DOCX package.
    #[error("Failed to parse DOCX file: {0}")]
    DocxParse(String),

    /// Error occurred during file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part required for the operation is absent from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Malformed XML in a package part or while writing XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The style table consumed by the annotator is malformed.
    #[error("Invalid style table: {0}")]
    StyleTable(String),

    /// The style table and the live document disagree on paragraph or run counts.
    #[error("Style table does not match document structure: {0}")]
    StructureMismatch(String),

    /// Error occurred while rendering the output tree.
    #[error("Rendering error: {0}")]
    Render(String),
}
