use crate::core::ast::{Node, NodeLabel};
use crate::docx::Footnote;

/// Converter for footnote bodies.
pub struct FootnoteConverter;

impl FootnoteConverter {
    /// Footnotes are numbered by position, the stored part ids are not reused.
    pub fn convert_all(footnotes: &[Footnote]) -> Vec<Node> {
        footnotes
            .iter()
            .enumerate()
            .map(|(i, note)| {
                Node::new(NodeLabel::Footnote)
                    .attr("id", (i + 1).to_string())
                    .with_text(note.text.trim())
            })
            .collect()
    }
}
