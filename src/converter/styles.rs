//! Style resolver - handles style inheritance through `w:basedOn` chains.

use crate::docx::{LineSpacingSpec, Paragraph, RunProperties, StyleDef, StyleSheet};

/// Longest `w:basedOn` chain followed before giving up on a cyclic sheet.
const MAX_CHAIN_DEPTH: usize = 32;

/// Resolver for DOCX styles and inheritance.
pub struct StyleResolver<'a> {
    styles: &'a StyleSheet,
}

impl<'a> StyleResolver<'a> {
    pub fn new(styles: &'a StyleSheet) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &'a StyleSheet {
        self.styles
    }

    /// Resolves the character properties the style extractor reports for a run.
    ///
    /// Font and size (highest priority first):
    /// 1. Direct formatting on the run (rPr)
    /// 2. Character style applied to the run (rStyle) and its ancestors
    /// 3. Paragraph style of the owning paragraph and its ancestors
    ///
    /// Bold, italic and color are taken from the run only.
    pub fn resolve_run_property(
        &self,
        direct: &RunProperties,
        para_style_id: Option<&str>,
    ) -> RunProperties {
        let run_style_id = direct.style_id.as_deref();
        let inherited = |pick: &dyn Fn(&StyleDef) -> bool| {
            self.find_in_chain(run_style_id, pick)
                .or_else(|| self.find_in_chain(para_style_id, pick))
        };

        let font = direct.font.clone().or_else(|| {
            inherited(&|style| style.run.font.is_some()).and_then(|style| style.run.font.clone())
        });
        let size_half_points = direct.size_half_points.or_else(|| {
            inherited(&|style| style.run.size_half_points.is_some())
                .and_then(|style| style.run.size_half_points)
        });

        RunProperties {
            font,
            size_half_points,
            ..direct.clone()
        }
    }

    /// Resolves the line spacing of a paragraph: direct `w:spacing`, then its style chain.
    pub fn resolve_line_spacing(&self, paragraph: &Paragraph) -> Option<LineSpacingSpec> {
        paragraph.properties.line_spacing.or_else(|| {
            self.find_in_chain(self.styles.paragraph_style_id(paragraph), &|style| {
                style.line_spacing.is_some()
            })
            .and_then(|style| style.line_spacing)
        })
    }

    /// First style in the chain starting at `style_id` that satisfies `pick`.
    fn find_in_chain(
        &self,
        style_id: Option<&str>,
        pick: &dyn Fn(&StyleDef) -> bool,
    ) -> Option<&'a StyleDef> {
        let mut current_id = style_id;
        let mut depth = 0;

        while let Some(id) = current_id {
            if depth == MAX_CHAIN_DEPTH {
                log::warn!("Style chain starting at {:?} is too deep or cyclic", style_id);
                return None;
            }
            let style = self.styles.get(id)?;
            if pick(style) {
                return Some(style);
            }
            current_id = style.based_on.as_deref();
            depth += 1;
        }

        None
    }
}
