//! Style tables: XML produced by the converter in the runs layout.

use crate::error::Error;
use crate::Result;
use std::path::Path;

/// Stored style of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunEntry {
    pub text: String,
    pub font: Option<String>,
    pub size: Option<String>,
    pub bold: Option<String>,
}

/// Runs of one paragraph-level node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphEntry {
    /// Element name, e.g. `paragraph` or `heading3`.
    pub label: String,
    pub runs: Vec<RunEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTable {
    pub paragraphs: Vec<ParagraphEntry>,
}

impl StyleTable {
    /// Reads a style table from disk. A missing file is an I/O error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let xml = roxmltree::Document::parse(text)
            .map_err(|e| Error::StyleTable(e.to_string()))?;
        let root = xml.root_element();
        if root.tag_name().name() != "document" {
            return Err(Error::StyleTable(format!(
                "expected <document> root, found <{}>",
                root.tag_name().name()
            )));
        }

        let paragraphs = root
            .children()
            .filter(|n| n.is_element())
            .filter(|n| is_paragraph_entry(n.tag_name().name()))
            .map(|node| ParagraphEntry {
                label: node.tag_name().name().to_string(),
                runs: node
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "content")
                    .map(|run| RunEntry {
                        text: run.text().unwrap_or_default().to_string(),
                        font: run.attribute("font").map(str::to_string),
                        size: run.attribute("size").map(str::to_string),
                        bold: run.attribute("bold").map(str::to_string),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { paragraphs })
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// Page parameters, tables and footnotes are not paragraph entries.
fn is_paragraph_entry(tag: &str) -> bool {
    if tag == "parameters_page" || tag == "footnote" {
        return false;
    }
    match tag.strip_prefix("table") {
        Some(number) => !number.chars().all(|c| c.is_ascii_digit()),
        None => true,
    }
}
