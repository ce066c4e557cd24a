//! Owned document model read from a DOCX package.
//!
//! Only what the converter and the annotator look at is kept. Values are stored
//! in their package units (twips, half-points) and converted at render time.

use crate::color::Rgb;
use std::collections::HashMap;

/// A parsed word-processing document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Body-level paragraphs in source order, including those inside content controls.
    pub paragraphs: Vec<Paragraph>,
    /// Body-level tables in source order.
    pub tables: Vec<Table>,
    /// One entry per `w:sectPr`, in document order.
    pub sections: Vec<Section>,
    /// Regular footnotes (separators excluded), in document order.
    pub footnotes: Vec<Footnote>,
    pub styles: StyleSheet,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub properties: ParagraphProperties,
    /// Direct `w:r` children, the runs the annotator can address.
    pub runs: Vec<Run>,
    /// Visible text of every run in the paragraph, nested ones included.
    pub text: String,
}

impl Paragraph {
    pub fn style_id(&self) -> Option<&str> {
        self.properties.style_id.as_deref()
    }

    pub fn has_drawing(&self) -> bool {
        self.runs.iter().any(|run| run.has_drawing)
    }

    /// Whether the paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    pub style_id: Option<String>,
    pub line_spacing: Option<LineSpacingSpec>,
    /// Direct `w:numPr`.
    pub numbered: bool,
}

/// `w:spacing/@w:line` together with its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpacingSpec {
    pub line: Option<i32>,
    pub rule: LineRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineRule {
    /// `line` is in 240ths of a line.
    #[default]
    Auto,
    /// `line` is in twips.
    Exact,
    /// `line` is in twips.
    AtLeast,
}

impl LineRule {
    pub fn parse(value: &str) -> Self {
        match value {
            "exact" => LineRule::Exact,
            "atLeast" => LineRule::AtLeast,
            _ => LineRule::Auto,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub properties: RunProperties,
    pub text: String,
    /// Contains `w:drawing` or a legacy `w:pict`.
    pub has_drawing: bool,
}

/// Character formatting as written on a run or in a style's `w:rPr`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    pub style_id: Option<String>,
    pub font: Option<String>,
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Page margins of one section, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Section {
    pub left: Option<i64>,
    pub right: Option<i64>,
    pub top: Option<i64>,
    pub bottom: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footnote {
    /// Raw `w:id` from the footnotes part.
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// A named style from `word/styles.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDef {
    pub id: String,
    /// Display name, built-in names mapped to their UI form (`heading 1` -> `Heading 1`).
    pub name: String,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub run: RunProperties,
    pub line_spacing: Option<LineSpacingSpec>,
    pub numbered: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub styles: HashMap<String, StyleDef>,
    /// Style applied to paragraphs without `w:pStyle`.
    pub default_paragraph: Option<String>,
}

impl StyleSheet {
    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    pub fn insert(&mut self, style: StyleDef) {
        self.styles.insert(style.id.clone(), style);
    }

    /// Effective paragraph style id: explicit `w:pStyle` or the document default.
    pub fn paragraph_style_id<'a>(&'a self, paragraph: &'a Paragraph) -> Option<&'a str> {
        paragraph
            .style_id()
            .or(self.default_paragraph.as_deref())
    }

    /// Whether the paragraph's style, or one it is based on, carries `w:numPr`.
    pub fn paragraph_style_numbered(&self, paragraph: &Paragraph) -> bool {
        let mut next = self.paragraph_style_id(paragraph);
        // bounded so a cyclic basedOn chain terminates
        for _ in 0..32 {
            let Some(style) = next.and_then(|id| self.get(id)) else {
                return false;
            };
            if style.numbered {
                return true;
            }
            next = style.based_on.as_deref();
        }
        false
    }

    /// Display name of a paragraph's style; empty when it has none.
    pub fn paragraph_style_name<'a>(&'a self, paragraph: &'a Paragraph) -> &'a str {
        self.paragraph_style_id(paragraph)
            .and_then(|id| self.get(id))
            .map(|style| style.name.as_str())
            .or_else(|| paragraph.style_id())
            .unwrap_or("")
    }
}

/// Maps built-in lowercase style names to the names Word shows.
pub fn ui_style_name(name: &str) -> String {
    const BUILT_IN: &[(&str, &str)] = &[
        ("normal", "Normal"),
        ("title", "Title"),
        ("subtitle", "Subtitle"),
        ("caption", "Caption"),
        ("header", "Header"),
        ("footer", "Footer"),
        ("footnote text", "Footnote Text"),
        ("toc heading", "TOC Heading"),
    ];

    if let Some(level) = name.strip_prefix("heading ") {
        return format!("Heading {}", level);
    }
    if let Some(level) = name.strip_prefix("toc ") {
        return format!("TOC {}", level);
    }
    BUILT_IN
        .iter()
        .find(|(internal, _)| *internal == name)
        .map(|(_, ui)| ui.to_string())
        .unwrap_or_else(|| name.to_string())
}
