//! Paragraph converter - classifies paragraphs and builds their nodes.

use super::run::format_decimal;
use super::{ConversionContext, RunConverter};
use crate::core::ast::{Node, NodeLabel};
use crate::docx::{LineRule, LineSpacingSpec, Paragraph, StyleSheet};
use crate::localization::LocalizationStrategy;
use crate::Layout;
use once_cell::sync::Lazy;
use regex::Regex;

/// Where the walk is relative to a table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TocState {
    #[default]
    ScanningNormal,
    /// A TOC heading was seen; the next non-blank paragraph is a TOC entry.
    ScanningToc,
}

/// What the walk does with one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Empty or whitespace-only text; no node.
    Blank,
    /// A TOC heading; no node.
    TocMarker,
    /// Emitted as `toc_content`.
    TocEntry,
    /// Emitted according to its style.
    Body,
}

impl Visit {
    pub fn emits_node(self) -> bool {
        matches!(self, Visit::TocEntry | Visit::Body)
    }
}

impl TocState {
    /// Decides how `text` is treated and returns the state for the next paragraph.
    pub fn step(self, text: &str, localization: &dyn LocalizationStrategy) -> (Visit, TocState) {
        if text.trim().is_empty() {
            return (Visit::Blank, self);
        }
        if localization.is_toc_marker(text) {
            return (Visit::TocMarker, TocState::ScanningToc);
        }
        match self {
            TocState::ScanningToc => (Visit::TocEntry, TocState::ScanningNormal),
            TocState::ScanningNormal => (Visit::Body, TocState::ScanningNormal),
        }
    }
}

/// A paragraph that produces a node, with its position among body paragraphs.
#[derive(Debug, Clone, Copy)]
pub struct WalkItem<'d> {
    pub index: usize,
    pub paragraph: &'d Paragraph,
    pub visit: Visit,
}

/// Iterates the paragraphs that produce nodes, threading the TOC state.
///
/// The converter and the annotator both walk documents through this, so a
/// style table lines up with the live paragraphs it was produced from.
pub struct ParagraphWalk<'d, 'l> {
    paragraphs: std::iter::Enumerate<std::slice::Iter<'d, Paragraph>>,
    state: TocState,
    localization: &'l dyn LocalizationStrategy,
}

impl<'d, 'l> ParagraphWalk<'d, 'l> {
    pub fn new(paragraphs: &'d [Paragraph], localization: &'l dyn LocalizationStrategy) -> Self {
        Self {
            paragraphs: paragraphs.iter().enumerate(),
            state: TocState::default(),
            localization,
        }
    }
}

impl<'d, 'l> Iterator for ParagraphWalk<'d, 'l> {
    type Item = WalkItem<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, paragraph) in self.paragraphs.by_ref() {
            let (visit, next_state) = self.state.step(&paragraph.text, self.localization);
            self.state = next_state;
            if visit.emits_node() {
                return Some(WalkItem {
                    index,
                    paragraph,
                    visit,
                });
            }
        }
        None
    }
}

/// Style-driven kind of a body paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    /// Style level from the style name when it has one (`Heading 2` -> 2).
    Heading(Option<u32>),
    List,
    Figure,
    Plain,
}

static HEADING_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Heading(?:\s*(\d+))?").expect("Invalid heading regex"));
static LIST_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^List (?:Bullet|Number)").expect("Invalid list regex"));

impl ParagraphKind {
    /// First matching rule wins: heading style, list, drawing, plain.
    pub fn classify(paragraph: &Paragraph, styles: &StyleSheet) -> Self {
        let style_name = styles.paragraph_style_name(paragraph);

        if let Some(caps) = HEADING_STYLE.captures(style_name) {
            let level = caps.get(1).and_then(|m| m.as_str().parse().ok());
            return ParagraphKind::Heading(level);
        }
        if LIST_STYLE.is_match(style_name)
            || paragraph.properties.numbered
            || styles.paragraph_style_numbered(paragraph)
        {
            return ParagraphKind::List;
        }
        if paragraph.has_drawing() {
            return ParagraphKind::Figure;
        }
        ParagraphKind::Plain
    }
}

/// `line_spacing_type` / `line_spacing_value` of a paragraph.
pub fn describe_line_spacing(spacing: Option<LineSpacingSpec>) -> (&'static str, String) {
    const UNKNOWN: &str = "Unknown";

    let Some(LineSpacingSpec {
        line: Some(line),
        rule,
    }) = spacing
    else {
        return (UNKNOWN, UNKNOWN.to_string());
    };

    match rule {
        LineRule::Auto => {
            let kind = match line {
                240 => "Single",
                360 => "1.5 lines",
                480 => "Double",
                _ => "Multiple",
            };
            (kind, format_decimal(f64::from(line) / 240.0))
        }
        LineRule::Exact => ("Exactly", format!("{}pt", format_decimal(f64::from(line) / 20.0))),
        LineRule::AtLeast => ("At least", format!("{}pt", format_decimal(f64::from(line) / 20.0))),
    }
}

/// Converter for Paragraph elements.
pub struct ParagraphConverter;

impl ParagraphConverter {
    /// Converts a walked paragraph into its paragraph-level node.
    pub fn convert(item: &WalkItem<'_>, context: &mut ConversionContext<'_>) -> Node {
        let paragraph = item.paragraph;
        let styles = context.styles();
        let para_style_id = styles.paragraph_style_id(paragraph);

        let (label, level) = match item.visit {
            Visit::TocEntry => (NodeLabel::TocContent, None),
            _ => match ParagraphKind::classify(paragraph, styles) {
                ParagraphKind::Heading(level) => {
                    (NodeLabel::Heading(context.next_heading_number()), level)
                }
                ParagraphKind::List => (NodeLabel::List, None),
                ParagraphKind::Figure => (NodeLabel::Figure, None),
                ParagraphKind::Plain => (NodeLabel::Paragraph, None),
            },
        };

        log::debug!(
            "Paragraph {} [{}] -> {}",
            item.index,
            styles.paragraph_style_name(paragraph),
            label.tag()
        );

        let mut node = Node::new(label);
        if let Some(level) = level {
            node = node.attr("level", level.to_string());
        }

        match context.layout() {
            Layout::Outline => {
                let text = if item.visit == Visit::TocEntry {
                    paragraph.text.as_str()
                } else {
                    context.truncate(&paragraph.text)
                };
                let style = match paragraph.runs.first() {
                    Some(run) => RunConverter::style_info(run, para_style_id, context),
                    None => Default::default(),
                };
                node = node.with_text(text).attrs(style.attributes());
            }
            Layout::Runs => {
                for run in &paragraph.runs {
                    node.children
                        .push(RunConverter::convert(run, para_style_id, context));
                }
            }
        }

        let (spacing_type, spacing_value) =
            describe_line_spacing(context.resolve_line_spacing(paragraph));
        node.attr("line_spacing_type", spacing_type)
            .attr("line_spacing_value", spacing_value)
    }
}
