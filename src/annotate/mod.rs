//! Font review: compares a document against a style table and marks the runs
//! whose stored font differs from the expected one.

mod parts;
mod rewrite;
mod style_table;

use crate::converter::ParagraphWalk;
use crate::docx::package::{COMMENTS_PART, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::docx::{read_package, Document, DocxPackage};
use crate::error::Error;
use crate::localization::{LocalizationStrategy, RussianLocalization};
use crate::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub use self::parts::NewComment;
pub use self::rewrite::{rewrite_document, RunPosition};
pub use self::style_table::{ParagraphEntry, RunEntry, StyleTable};

/// Options for annotating a document.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Font every run is expected to use.
    pub expected_font: String,
    /// Text of the comment attached to each flagged run.
    pub comment_text: String,
    pub author: String,
    /// `w:highlight` value given to flagged runs.
    pub highlight: String,
    /// Annotate the common prefix instead of failing when the style table and
    /// the document have different paragraph or run counts.
    pub allow_mismatch: bool,
}

impl AnnotateOptions {
    /// Defaults with the review comment of `localization`.
    pub fn localized(localization: &dyn LocalizationStrategy) -> Self {
        Self {
            comment_text: localization.font_review_comment().to_string(),
            ..Default::default()
        }
    }
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            expected_font: "Times New Roman".to_string(),
            comment_text: RussianLocalization.font_review_comment().to_string(),
            author: "System".to_string(),
            highlight: "yellow".to_string(),
            allow_mismatch: false,
        }
    }
}

/// Counts of one annotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    pub paragraphs_checked: usize,
    pub runs_checked: usize,
    pub runs_flagged: usize,
    pub comments_added: usize,
}

/// Runs to flag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPlan {
    pub flagged: Vec<RunPosition>,
    pub paragraphs_checked: usize,
    pub runs_checked: usize,
}

pub struct Annotator {
    options: AnnotateOptions,
    localization: &'static dyn LocalizationStrategy,
}

impl Annotator {
    /// TOC markers default to Russian, matching the converter.
    pub fn new(options: AnnotateOptions) -> Self {
        Self {
            options,
            localization: &RussianLocalization,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnnotateOptions::default())
    }

    /// TOC markers used when walking paragraphs; must match the conversion
    /// that produced the style table.
    pub fn with_localization(mut self, localization: &'static dyn LocalizationStrategy) -> Self {
        self.localization = localization;
        self
    }

    pub fn options(&self) -> &AnnotateOptions {
        &self.options
    }

    /// Annotates `input` against `style_table` and writes the result to `output`.
    ///
    /// `output` may be the input path; the package is read fully first.
    pub fn annotate<P, S, Q>(&self, input: P, style_table: S, output: Q) -> Result<AnnotationReport>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let table = StyleTable::load(style_table.as_ref())?;
        let bytes = std::fs::read(input.as_ref())?;
        let mut package = DocxPackage::from_bytes(bytes)?;
        let document = read_package(&mut package)?;

        let plan = self.plan(&document, &table)?;
        let replacements = self.build_replacements(&mut package, &plan)?;
        parts::write_package(&mut package, output.as_ref(), replacements)?;

        let report = AnnotationReport {
            paragraphs_checked: plan.paragraphs_checked,
            runs_checked: plan.runs_checked,
            runs_flagged: plan.flagged.len(),
            comments_added: plan.flagged.len(),
        };
        log::info!(
            "Annotated {}: {} of {} runs flagged in {} paragraphs",
            output.as_ref().display(),
            report.runs_flagged,
            report.runs_checked,
            report.paragraphs_checked
        );
        Ok(report)
    }

    /// Lines up style table entries with the live paragraphs and picks the runs to flag.
    pub fn plan(&self, document: &Document, table: &StyleTable) -> Result<AnnotationPlan> {
        let live: Vec<_> = ParagraphWalk::new(&document.paragraphs, self.localization).collect();

        if live.len() != table.len() {
            self.mismatch(format!(
                "style table has {} paragraphs, document has {}",
                table.len(),
                live.len()
            ))?;
        }

        let mut plan = AnnotationPlan::default();
        for (ordinal, (item, entry)) in live.iter().zip(&table.paragraphs).enumerate() {
            let runs = &item.paragraph.runs;
            if runs.len() != entry.runs.len() {
                self.mismatch(format!(
                    "paragraph {} <{}>: style table has {} runs, document has {}",
                    ordinal + 1,
                    entry.label,
                    entry.runs.len(),
                    runs.len()
                ))?;
            }

            plan.paragraphs_checked += 1;
            for (run_index, stored) in entry.runs.iter().take(runs.len()).enumerate() {
                plan.runs_checked += 1;
                if stored.font.as_deref() != Some(self.options.expected_font.as_str()) {
                    log::debug!(
                        "Run {:?} in paragraph {} uses {:?}",
                        stored.text,
                        item.index,
                        stored.font
                    );
                    plan.flagged.push((item.index, run_index));
                }
            }
        }

        Ok(plan)
    }

    fn mismatch(&self, message: String) -> Result<()> {
        if self.options.allow_mismatch {
            log::warn!("{}; annotating the common part only", message);
            Ok(())
        } else {
            Err(Error::StructureMismatch(message))
        }
    }

    /// New contents of every part that changes, keyed by part name.
    fn build_replacements<R: std::io::Read + std::io::Seek>(
        &self,
        package: &mut DocxPackage<R>,
        plan: &AnnotationPlan,
    ) -> Result<BTreeMap<String, Vec<u8>>> {
        let mut replacements = BTreeMap::new();
        if plan.flagged.is_empty() {
            return Ok(replacements);
        }

        let existing_comments = package.read_part(COMMENTS_PART)?;
        let first_id = match &existing_comments {
            Some(xml) => parts::max_comment_id(xml)?.map_or(0, |max| max + 1),
            None => 0,
        };

        let marks: BTreeMap<RunPosition, u32> = plan.flagged.iter().copied().zip(first_id..).collect();
        let comments: Vec<NewComment> = marks
            .values()
            .map(|&id| NewComment {
                id,
                author: self.options.author.clone(),
                text: self.options.comment_text.clone(),
            })
            .collect();

        let document_xml = package.require_part(DOCUMENT_PART)?;
        let rewritten = rewrite_document(&document_xml, &marks, &self.options.highlight)?;
        replacements.insert(DOCUMENT_PART.to_string(), rewritten.into_bytes());

        let comments_xml = match &existing_comments {
            Some(xml) => parts::append_comments(xml, &comments)?,
            None => parts::new_comments_part(&comments)?,
        };
        replacements.insert(COMMENTS_PART.to_string(), comments_xml.into_bytes());

        let rels = package.read_part(DOCUMENT_RELS_PART)?;
        if let Some(updated) = parts::ensure_comments_relationship(rels.as_deref())? {
            replacements.insert(DOCUMENT_RELS_PART.to_string(), updated.into_bytes());
        }

        let content_types = package.require_part(CONTENT_TYPES_PART)?;
        if let Some(updated) = parts::ensure_comments_override(&content_types)? {
            replacements.insert(CONTENT_TYPES_PART.to_string(), updated.into_bytes());
        }

        log::debug!("Adding comments {}..{}", first_id, first_id + comments.len() as u32);
        Ok(replacements)
    }
}

/// Annotates with default options.
pub fn annotate<P, S, Q>(input: P, style_table: S, output: Q) -> Result<AnnotationReport>
where
    P: AsRef<Path>,
    S: AsRef<Path>,
    Q: AsRef<Path>,
{
    Annotator::with_defaults().annotate(input, style_table, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{Paragraph, Run, RunProperties};

    fn paragraph(text: &str, runs: usize) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            runs: (0..runs)
                .map(|_| Run {
                    properties: RunProperties::default(),
                    text: text.to_string(),
                    has_drawing: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn entry(fonts: &[Option<&str>]) -> ParagraphEntry {
        ParagraphEntry {
            label: "paragraph".into(),
            runs: fonts
                .iter()
                .map(|font| RunEntry {
                    font: font.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn document() -> Document {
        Document {
            paragraphs: vec![
                paragraph("Содержание", 1),
                paragraph("Intro 1", 1),
                paragraph("", 0),
                paragraph("Body", 2),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_flags_wrong_and_missing_fonts() {
        let table = StyleTable {
            paragraphs: vec![
                entry(&[Some("Times New Roman")]),
                entry(&[Some("Arial"), None]),
            ],
        };
        let plan = Annotator::with_defaults().plan(&document(), &table).unwrap();
        assert_eq!(plan.flagged, vec![(3, 0), (3, 1)]);
        assert_eq!(plan.paragraphs_checked, 2);
        assert_eq!(plan.runs_checked, 3);
    }

    #[test]
    fn test_plan_rejects_paragraph_count_mismatch() {
        let table = StyleTable {
            paragraphs: vec![entry(&[Some("Arial")])],
        };
        let err = Annotator::with_defaults().plan(&document(), &table).unwrap_err();
        assert!(matches!(err, Error::StructureMismatch(_)));
    }

    #[test]
    fn test_plan_rejects_run_count_mismatch() {
        let table = StyleTable {
            paragraphs: vec![entry(&[Some("Arial")]), entry(&[Some("Arial")])],
        };
        let err = Annotator::with_defaults().plan(&document(), &table).unwrap_err();
        assert!(err.to_string().contains("paragraph 2"));
    }

    #[test]
    fn test_lenient_plan_uses_common_prefix() {
        let table = StyleTable {
            paragraphs: vec![entry(&[Some("Arial"), Some("Arial"), Some("Arial")])],
        };
        let annotator = Annotator::new(AnnotateOptions {
            allow_mismatch: true,
            ..Default::default()
        });
        let plan = annotator.plan(&document(), &table).unwrap();
        assert_eq!(plan.flagged, vec![(1, 0)]);
        assert_eq!(plan.paragraphs_checked, 1);
    }

    #[test]
    fn test_localized_options() {
        let options = AnnotateOptions::localized(&crate::localization::EnglishLocalization);
        assert_eq!(options.comment_text, "Choose the correct font");
        assert_eq!(options.expected_font, "Times New Roman");
    }
}
