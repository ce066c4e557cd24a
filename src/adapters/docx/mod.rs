mod extractor;

use crate::converter::ConversionContext;
use crate::core::ast::DocumentAst;
use crate::docx::Document;
use crate::Result;

pub trait AstExtractor {
    fn extract(&self, document: &Document, context: &mut ConversionContext<'_>)
        -> Result<DocumentAst>;
}

pub use extractor::DocxExtractor;
