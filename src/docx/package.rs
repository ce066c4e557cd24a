//! Access to the parts of a DOCX (OPC/ZIP) package.

use crate::error::Error;
use crate::Result;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";
pub const COMMENTS_PART: &str = "word/comments.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// An opened DOCX package.
pub struct DocxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl DocxPackage<BufReader<File>> {
    /// Opens a package from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl DocxPackage<Cursor<Vec<u8>>> {
    /// Opens a package held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> DocxPackage<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Reads a part as raw bytes; `None` when the package has no such entry.
    pub fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// Reads a part as UTF-8 text with any byte order mark removed.
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>> {
        match self.read_bytes(name)? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| Error::DocxParse(format!("{} is not UTF-8: {}", name, e)))?;
                Ok(Some(strip_bom(&text).to_string()))
            }
            None => Ok(None),
        }
    }

    /// Reads a part that must exist.
    pub fn require_part(&mut self, name: &str) -> Result<String> {
        self.read_part(name)?
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Name, directory flag and content of the entry at `index`.
    pub fn entry_at(&mut self, index: usize) -> Result<(String, bool, Vec<u8>)> {
        let mut entry = self.archive.by_index(index)?;
        let name = entry.name().to_string();
        let is_dir = entry.is_dir();
        let mut bytes = Vec::new();
        if !is_dir {
            entry.read_to_end(&mut bytes)?;
        }
        Ok((name, is_dir, bytes))
    }
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}
