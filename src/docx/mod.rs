//! DOCX package access and the document model read from it.

pub mod model;
pub mod package;
pub mod reader;

pub use self::model::{
    Document, Footnote, LineRule, LineSpacingSpec, Paragraph, ParagraphProperties, Run,
    RunProperties, Section, StyleDef, StyleKind, StyleSheet, Table, TableCell, TableRow,
};
pub use self::package::DocxPackage;
pub use self::reader::{load_document, read_package};
