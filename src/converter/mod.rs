//! Converter modules for DOCX to XML transformation.

mod context;
mod footnote;
mod paragraph;
mod run;
mod section;
mod styles;
mod table;

use crate::adapters::docx::{AstExtractor, DocxExtractor};
use crate::color::{ColorNamer, LocalPalette};
use crate::core::ast::DocumentAst;
use crate::docx::{load_document, Document};
use crate::localization::{LocalizationStrategy, RussianLocalization};
use crate::render::{Renderer, XmlRenderer};
use crate::{ConvertOptions, Result};
use std::path::Path;

pub use self::context::{text_before_period, ConversionContext};
pub use self::footnote::FootnoteConverter;
pub use self::paragraph::{
    describe_line_spacing, ParagraphConverter, ParagraphKind, ParagraphWalk, TocState, Visit,
    WalkItem,
};
pub use self::run::{FontColor, RunConverter, StyleInfo};
pub use self::section::{twips_to_cm, SectionConverter};
pub use self::styles::StyleResolver;
pub use self::table::TableConverter;

/// Main converter struct that orchestrates DOCX to XML conversion.
pub struct DocxToXml {
    options: ConvertOptions,
    color_namer: Box<dyn ColorNamer>,
    localization: &'static dyn LocalizationStrategy,
}

impl DocxToXml {
    /// Creates a new converter with the given options, the local color palette
    /// and Russian TOC markers.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            color_namer: Box::new(LocalPalette::default()),
            localization: &RussianLocalization,
        }
    }

    /// Creates a new converter with default options.
    pub fn with_defaults() -> Self {
        Self::new(ConvertOptions::default())
    }

    pub fn with_color_namer(mut self, color_namer: Box<dyn ColorNamer>) -> Self {
        self.color_namer = color_namer;
        self
    }

    pub fn with_localization(mut self, localization: &'static dyn LocalizationStrategy) -> Self {
        self.localization = localization;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts a DOCX file to XML.
    ///
    /// # Arguments
    /// * `path` - Path to the DOCX file
    ///
    /// # Returns
    /// The XML document as a String, declaration included.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        log::info!("Converting {}", path.display());
        let document = load_document(path)?;
        self.convert_document(&document)
    }

    /// Converts an already loaded document.
    pub fn convert_document(&self, document: &Document) -> Result<String> {
        let ast = self.build_ast(document)?;
        XmlRenderer.render(&ast)
    }

    /// Converts `input` and writes the XML to `output`.
    pub fn convert_to_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<()> {
        let xml = self.convert(input)?;
        std::fs::write(output.as_ref(), xml)?;
        log::info!("Wrote {}", output.as_ref().display());
        Ok(())
    }

    /// Builds the node tree without serializing it.
    pub fn build_ast(&self, document: &Document) -> Result<DocumentAst> {
        let mut context = ConversionContext::new(
            &document.styles,
            &self.options,
            self.color_namer.as_ref(),
            self.localization,
        );
        let ast = DocxExtractor.extract(document, &mut context)?;
        log::info!(
            "Built {} blocks ({} headings), {} tables, {} footnotes",
            ast.blocks.len(),
            context.heading_count(),
            context.table_count(),
            ast.footnotes.len()
        );
        Ok(ast)
    }
}

impl Default for DocxToXml {
    fn default() -> Self {
        Self::with_defaults()
    }
}
