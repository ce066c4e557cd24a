use super::run::FontColor;
use super::StyleResolver;
use crate::color::{ColorNamer, Rgb};
use crate::docx::{LineSpacingSpec, Paragraph, RunProperties, StyleSheet};
use crate::localization::LocalizationStrategy;
use crate::{ConvertOptions, Layout};

/// Context passed through conversion for shared state.
pub struct ConversionContext<'a> {
    options: &'a ConvertOptions,
    style_resolver: StyleResolver<'a>,
    color_namer: &'a dyn ColorNamer,
    localization: &'a dyn LocalizationStrategy,
    heading_count: usize,
    table_count: usize,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        styles: &'a StyleSheet,
        options: &'a ConvertOptions,
        color_namer: &'a dyn ColorNamer,
        localization: &'a dyn LocalizationStrategy,
    ) -> Self {
        Self {
            options,
            style_resolver: StyleResolver::new(styles),
            color_namer,
            localization,
            heading_count: 0,
            table_count: 0,
        }
    }

    pub fn layout(&self) -> Layout {
        self.options.layout
    }

    pub fn include_page_parameters(&self) -> bool {
        self.options.include_page_parameters
    }

    pub fn include_footnotes(&self) -> bool {
        self.options.include_footnotes
    }

    pub fn localization(&self) -> &'a dyn LocalizationStrategy {
        self.localization
    }

    /// Applies the configured text truncation (everything before the first `.`).
    pub fn truncate<'t>(&self, text: &'t str) -> &'t str {
        if self.options.truncate_at_period {
            text_before_period(text)
        } else {
            text
        }
    }

    pub fn styles(&self) -> &'a StyleSheet {
        self.style_resolver.styles()
    }

    pub fn resolve_run_property(
        &self,
        direct: &RunProperties,
        para_style_id: Option<&str>,
    ) -> RunProperties {
        self.style_resolver.resolve_run_property(direct, para_style_id)
    }

    pub fn resolve_line_spacing(&self, paragraph: &Paragraph) -> Option<LineSpacingSpec> {
        self.style_resolver.resolve_line_spacing(paragraph)
    }

    /// Names a run color; a failed lookup is logged and reported as unresolved.
    pub fn color_name(&self, rgb: Rgb) -> FontColor {
        match self.color_namer.name(rgb) {
            Ok(name) => FontColor::Named(name),
            Err(err) => {
                log::warn!("Error converting color {}: {}", rgb, err);
                FontColor::Unresolved(rgb)
            }
        }
    }

    /// Next heading ordinal; one counter for the whole document.
    pub fn next_heading_number(&mut self) -> usize {
        self.heading_count += 1;
        self.heading_count
    }

    pub fn next_table_number(&mut self) -> usize {
        self.table_count += 1;
        self.table_count
    }

    pub fn heading_count(&self) -> usize {
        self.heading_count
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }
}

/// Text up to the first `.`, or the whole text when it has none.
pub fn text_before_period(text: &str) -> &str {
    text.split('.').next().unwrap_or(text)
}
