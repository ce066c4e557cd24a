mod xml;

use crate::core::ast::DocumentAst;
use crate::Result;

pub use xml::XmlRenderer;

pub trait Renderer {
    fn render(&self, document: &DocumentAst) -> Result<String>;
}
