use super::Renderer;
use crate::core::ast::{DocumentAst, Node};
use crate::error::Error;
use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serializes the node tree as an indented XML document.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlRenderer;

impl Renderer for XmlRenderer {
    fn render(&self, document: &DocumentAst) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::Render(format!("Failed to write XML declaration: {}", e)))?;

        write_node(&mut writer, &document.to_root())?;

        let bytes = writer.into_inner().into_inner();
        let mut xml = String::from_utf8(bytes)
            .map_err(|e| Error::Render(format!("Invalid UTF-8 in generated XML: {}", e)))?;
        xml.push('\n');
        Ok(xml)
    }
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &Node) -> Result<()> {
    let tag = node.label.tag();
    let mut start = BytesStart::new(tag.as_ref());
    for (name, value) in &node.attributes {
        if !value.is_empty() {
            start.push_attribute((*name, value.as_str()));
        }
    }

    let text = node.text.as_deref().filter(|text| !text.is_empty());
    if text.is_none() && node.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Render(format!("Failed to write <{}/>: {}", tag, e)));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Render(format!("Failed to write <{}>: {}", tag, e)))?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::Render(format!("Failed to write text of <{}>: {}", tag, e)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag.as_ref())))
        .map_err(|e| Error::Render(format!("Failed to close <{}>: {}", tag, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::NodeLabel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_indented_document() {
        let ast = DocumentAst {
            page_parameters: vec![Node::new(NodeLabel::ParametersPage).attr("left_margin", "3")],
            blocks: vec![Node::new(NodeLabel::Heading(1))
                .with_text("Intro & <more>")
                .attr("font", "Arial")
                .attr("level", "")],
            tables: vec![Node::new(NodeLabel::Table(1))
                .push(Node::new(NodeLabel::Row).push(Node::new(NodeLabel::Cell).with_text("a")))],
            footnotes: Vec::new(),
        };

        let xml = XmlRenderer.render(&ast).unwrap();
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <parameters_page left_margin="3"/>
  <heading1 font="Arial">Intro &amp; &lt;more&gt;</heading1>
  <table1>
    <row>
      <cell>a</cell>
    </row>
  </table1>
</document>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_empty_document() {
        let xml = XmlRenderer.render(&DocumentAst::default()).unwrap();
        assert!(xml.ends_with("<document/>\n"));
    }
}
