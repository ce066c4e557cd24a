use super::AstExtractor;
use crate::converter::{
    ConversionContext, FootnoteConverter, ParagraphConverter, ParagraphWalk, SectionConverter,
    TableConverter,
};
use crate::core::ast::DocumentAst;
use crate::docx::Document;
use crate::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl AstExtractor for DocxExtractor {
    fn extract(
        &self,
        document: &Document,
        context: &mut ConversionContext<'_>,
    ) -> Result<DocumentAst> {
        let mut doc = DocumentAst::default();

        if context.include_page_parameters() {
            doc.page_parameters = document.sections.iter().map(SectionConverter::convert).collect();
        }

        for item in ParagraphWalk::new(&document.paragraphs, context.localization()) {
            doc.blocks.push(ParagraphConverter::convert(&item, context));
        }

        for table in &document.tables {
            let converted = TableConverter::convert(table, context);
            doc.tables.push(converted);
        }

        if context.include_footnotes() {
            doc.footnotes = FootnoteConverter::convert_all(&document.footnotes);
        }

        Ok(doc)
    }
}
