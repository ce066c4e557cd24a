//! Reads the document model out of WordprocessingML parts.

use super::model::{
    ui_style_name, Document, Footnote, LineRule, LineSpacingSpec, Paragraph, ParagraphProperties,
    Run, RunProperties, Section, StyleDef, StyleKind, StyleSheet, Table, TableCell, TableRow,
};
use super::package::{DocxPackage, DOCUMENT_PART, FOOTNOTES_PART, STYLES_PART};
use crate::color::Rgb;
use crate::error::Error;
use crate::Result;
use roxmltree::{Document as XmlDoc, Node};
use std::io::{Read, Seek};
use std::path::Path;

pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const W_NS_STRICT: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

/// Opens a `.docx` file and reads its document model.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let mut package = DocxPackage::open(path)?;
    read_package(&mut package)
}

/// Reads the document model from an opened package.
pub fn read_package<R: Read + Seek>(package: &mut DocxPackage<R>) -> Result<Document> {
    let document_xml = package.require_part(DOCUMENT_PART)?;
    let mut document = parse_document_xml(&document_xml)?;

    if let Some(styles_xml) = package.read_part(STYLES_PART)? {
        document.styles = parse_styles_xml(&styles_xml)?;
    }
    if let Some(footnotes_xml) = package.read_part(FOOTNOTES_PART)? {
        document.footnotes = parse_footnotes_xml(&footnotes_xml)?;
    }

    log::debug!(
        "Read {} paragraphs, {} tables, {} sections, {} footnotes, {} styles",
        document.paragraphs.len(),
        document.tables.len(),
        document.sections.len(),
        document.footnotes.len(),
        document.styles.styles.len()
    );

    Ok(document)
}

fn parse_part<'i>(part: &str, text: &'i str) -> Result<XmlDoc<'i>> {
    XmlDoc::parse(text).map_err(|e| Error::DocxParse(format!("{}: {}", part, e)))
}

/// Parses `word/document.xml`. Styles and footnotes are left empty.
pub fn parse_document_xml(text: &str) -> Result<Document> {
    let xml = parse_part(DOCUMENT_PART, text)?;
    let body = xml
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| Error::DocxParse(format!("{} has no w:body", DOCUMENT_PART)))?;

    let mut document = Document::default();
    read_block_container(body, &mut document);
    Ok(document)
}

/// Reads block-level content, descending into content controls.
fn read_block_container(container: Node<'_, '_>, document: &mut Document) {
    for child in container.children().filter(Node::is_element) {
        if is_w(&child, "p") {
            if let Some(sect_pr) = w_child(child, "pPr").and_then(|ppr| w_child(ppr, "sectPr")) {
                document.sections.push(read_section(sect_pr));
            }
            document.paragraphs.push(read_paragraph(child));
        } else if is_w(&child, "tbl") {
            document.tables.push(read_table(child));
        } else if is_w(&child, "sdt") {
            if let Some(content) = w_child(child, "sdtContent") {
                read_block_container(content, document);
            }
        } else if is_w(&child, "sectPr") {
            document.sections.push(read_section(child));
        }
    }
}

pub(crate) fn is_w(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && is_w_ns(node.tag_name().namespace())
}

fn is_w_ns(ns: Option<&str>) -> bool {
    matches!(ns, Some(W_NS) | Some(W_NS_STRICT))
}

fn w_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|c| is_w(c, name))
}

fn w_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name && is_w_ns(a.namespace()))
        .map(|a| a.value())
}

fn child_val<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    w_child(node, name).and_then(|c| w_attr(c, "val"))
}

/// `w:b`, `w:i` and friends: present without `w:val` means on.
fn on_off(node: Node<'_, '_>) -> bool {
    !matches!(w_attr(node, "val"), Some("0" | "false" | "off"))
}

fn read_paragraph(node: Node<'_, '_>) -> Paragraph {
    let mut para = Paragraph::default();
    for child in node.children().filter(Node::is_element) {
        if !is_w_ns(child.tag_name().namespace()) {
            continue;
        }
        match child.tag_name().name() {
            "pPr" => para.properties = read_paragraph_properties(child),
            "r" => {
                let run = read_run(child);
                para.text.push_str(&run.text);
                para.runs.push(run);
            }
            "hyperlink" | "smartTag" | "ins" | "fldSimple" | "customXml" | "sdt" => {
                para.text.push_str(&nested_text(child));
            }
            _ => {}
        }
    }
    para
}

fn read_paragraph_properties(ppr: Node<'_, '_>) -> ParagraphProperties {
    ParagraphProperties {
        style_id: child_val(ppr, "pStyle").map(str::to_string),
        line_spacing: read_line_spacing(ppr),
        numbered: has_numbering(ppr),
    }
}

fn has_numbering(ppr: Node<'_, '_>) -> bool {
    match w_child(ppr, "numPr") {
        // numId 0 removes inherited numbering
        Some(num_pr) => child_val(num_pr, "numId") != Some("0"),
        None => false,
    }
}

fn read_line_spacing(ppr: Node<'_, '_>) -> Option<LineSpacingSpec> {
    let spacing = w_child(ppr, "spacing")?;
    let line = w_attr(spacing, "line")?.trim().parse::<i32>().ok()?;
    Some(LineSpacingSpec {
        line: Some(line),
        rule: w_attr(spacing, "lineRule")
            .map(LineRule::parse)
            .unwrap_or_default(),
    })
}

fn read_run(node: Node<'_, '_>) -> Run {
    Run {
        properties: w_child(node, "rPr")
            .map(read_run_properties)
            .unwrap_or_default(),
        text: run_text(node),
        has_drawing: node
            .descendants()
            .any(|n| is_w(&n, "drawing") || is_w(&n, "pict")),
    }
}

fn read_run_properties(rpr: Node<'_, '_>) -> RunProperties {
    let fonts = w_child(rpr, "rFonts");
    RunProperties {
        style_id: child_val(rpr, "rStyle").map(str::to_string),
        font: fonts
            .and_then(|f| w_attr(f, "ascii").or_else(|| w_attr(f, "hAnsi")))
            .map(str::to_string),
        size_half_points: child_val(rpr, "sz").and_then(|v| v.trim().parse().ok()),
        bold: w_child(rpr, "b").map(on_off),
        italic: w_child(rpr, "i").map(on_off),
        color: child_val(rpr, "color").and_then(Rgb::from_hex),
    }
}

fn run_text(run: Node<'_, '_>) -> String {
    let mut text = String::new();
    for child in run.children().filter(Node::is_element) {
        if !is_w_ns(child.tag_name().namespace()) {
            continue;
        }
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or("")),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

fn nested_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| is_w(n, "r"))
        .map(run_text)
        .collect()
}

fn read_table(node: Node<'_, '_>) -> Table {
    let rows = node
        .children()
        .filter(|n| is_w(n, "tr"))
        .map(|tr| TableRow {
            cells: tr
                .children()
                .filter(|n| is_w(n, "tc"))
                .map(|tc| TableCell {
                    paragraphs: tc
                        .children()
                        .filter(|n| is_w(n, "p"))
                        .map(read_paragraph)
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Table { rows }
}

fn read_section(sect_pr: Node<'_, '_>) -> Section {
    let margins = w_child(sect_pr, "pgMar");
    let margin = |name: &str| {
        margins
            .and_then(|m| w_attr(m, name))
            .and_then(|v| v.trim().parse::<i64>().ok())
    };
    Section {
        left: margin("left"),
        right: margin("right"),
        top: margin("top"),
        bottom: margin("bottom"),
    }
}

/// Parses `word/footnotes.xml`, skipping separator notes.
pub fn parse_footnotes_xml(text: &str) -> Result<Vec<Footnote>> {
    let xml = parse_part(FOOTNOTES_PART, text)?;
    let footnotes = xml
        .root_element()
        .children()
        .filter(|n| is_w(n, "footnote"))
        .filter(|n| {
            !matches!(
                w_attr(*n, "type"),
                Some("separator" | "continuationSeparator" | "continuationNotice")
            )
        })
        .map(|note| Footnote {
            id: w_attr(note, "id").unwrap_or_default().to_string(),
            text: note
                .children()
                .filter(|n| is_w(n, "p"))
                .map(|p| read_paragraph(p).text)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string(),
        })
        .collect();
    Ok(footnotes)
}

/// Parses `word/styles.xml`.
pub fn parse_styles_xml(text: &str) -> Result<StyleSheet> {
    let xml = parse_part(STYLES_PART, text)?;
    let mut sheet = StyleSheet::default();

    for node in xml.root_element().children().filter(|n| is_w(n, "style")) {
        let Some(id) = w_attr(node, "styleId") else {
            continue;
        };
        let kind = match w_attr(node, "type") {
            Some("character") => StyleKind::Character,
            Some("table") => StyleKind::Table,
            Some("numbering") => StyleKind::Numbering,
            _ => StyleKind::Paragraph,
        };
        if kind == StyleKind::Paragraph && matches!(w_attr(node, "default"), Some("1" | "true" | "on")) {
            sheet.default_paragraph = Some(id.to_string());
        }

        let ppr = w_child(node, "pPr");
        sheet.insert(StyleDef {
            id: id.to_string(),
            name: ui_style_name(child_val(node, "name").unwrap_or(id)),
            kind,
            based_on: child_val(node, "basedOn").map(str::to_string),
            run: w_child(node, "rPr")
                .map(read_run_properties)
                .unwrap_or_default(),
            line_spacing: ppr.and_then(read_line_spacing),
            numbered: ppr.map(has_numbering).unwrap_or(false),
        });
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, body
        )
    }

    #[test]
    fn test_paragraph_runs_and_text() {
        let xml = wrap_body(
            r#"<w:p>
                <w:pPr><w:pStyle w:val="Heading1"/><w:spacing w:line="360" w:lineRule="auto"/></w:pPr>
                <w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:b/><w:i w:val="0"/><w:sz w:val="28"/><w:color w:val="FF0000"/></w:rPr><w:t>Hello</w:t></w:r>
                <w:hyperlink><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:hyperlink>
                <w:r><w:tab/><w:t>end</w:t></w:r>
            </w:p>"#,
        );
        let doc = parse_document_xml(&xml).expect("document should parse");
        assert_eq!(doc.paragraphs.len(), 1);

        let para = &doc.paragraphs[0];
        assert_eq!(para.style_id(), Some("Heading1"));
        assert_eq!(para.text, "Hello world\tend");
        assert_eq!(para.runs.len(), 2);
        assert_eq!(
            para.properties.line_spacing,
            Some(LineSpacingSpec {
                line: Some(360),
                rule: LineRule::Auto
            })
        );

        let props = &para.runs[0].properties;
        assert_eq!(props.font.as_deref(), Some("Arial"));
        assert_eq!(props.size_half_points, Some(28));
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, Some(false));
        assert_eq!(props.color, Some(Rgb::new(255, 0, 0)));
        assert_eq!(para.runs[1].properties, RunProperties::default());
    }

    #[test]
    fn test_tables_sections_and_content_controls() {
        let xml = wrap_body(
            r#"<w:sdt><w:sdtContent><w:p><w:r><w:t>Inside</w:t></w:r></w:p></w:sdtContent></w:sdt>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>
               <w:p><w:pPr><w:sectPr><w:pgMar w:left="1701" w:right="850" w:top="1134" w:bottom="1134"/></w:sectPr></w:pPr></w:p>
               <w:sectPr><w:pgMar w:left="1440" w:right="1440" w:top="1440" w:bottom="1440"/></w:sectPr>"#,
        );
        let doc = parse_document_xml(&xml).expect("document should parse");
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].text, "Inside");
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].rows[0].cells.len(), 2);
        assert_eq!(doc.tables[0].rows[0].cells[0].text(), "A");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].left, Some(1701));
        assert_eq!(doc.sections[1].bottom, Some(1440));
    }

    #[test]
    fn test_drawing_detection() {
        let xml = wrap_body(r#"<w:p><w:r><w:drawing/></w:r><w:r><w:t>Figure 1</w:t></w:r></w:p>"#);
        let doc = parse_document_xml(&xml).expect("document should parse");
        assert!(doc.paragraphs[0].has_drawing());
        assert!(doc.paragraphs[0].runs[0].has_drawing);
        assert!(!doc.paragraphs[0].runs[1].has_drawing);
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let xml = format!(r#"<w:document xmlns:w="{}"/>"#, W_NS);
        assert!(matches!(parse_document_xml(&xml), Err(Error::DocxParse(_))));
    }

    #[test]
    fn test_footnotes_skip_separators() {
        let xml = format!(
            r#"<w:footnotes xmlns:w="{}">
                <w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
                <w:footnote w:type="continuationSeparator" w:id="0"><w:p/></w:footnote>
                <w:footnote w:id="1"><w:p><w:r><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> First note.</w:t></w:r></w:p></w:footnote>
                <w:footnote w:id="2"><w:p><w:r><w:t>Second</w:t></w:r></w:p><w:p><w:r><w:t>note</w:t></w:r></w:p></w:footnote>
            </w:footnotes>"#,
            W_NS
        );
        let notes = parse_footnotes_xml(&xml).expect("footnotes should parse");
        assert_eq!(
            notes,
            vec![
                Footnote {
                    id: "1".into(),
                    text: "First note.".into()
                },
                Footnote {
                    id: "2".into(),
                    text: "Second note".into()
                },
            ]
        );
    }

    #[test]
    fn test_styles_names_chain_and_default() {
        let xml = format!(
            r#"<w:styles xmlns:w="{}">
                <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/>
                    <w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:sz w:val="24"/></w:rPr></w:style>
                <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/>
                    <w:pPr><w:spacing w:line="240" w:lineRule="auto"/></w:pPr></w:style>
                <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/><w:rPr><w:b/></w:rPr></w:style>
            </w:styles>"#,
            W_NS
        );
        let sheet = parse_styles_xml(&xml).expect("styles should parse");
        assert_eq!(sheet.default_paragraph.as_deref(), Some("Normal"));

        let heading = sheet.get("Heading1").expect("heading style");
        assert_eq!(heading.name, "Heading 1");
        assert_eq!(heading.based_on.as_deref(), Some("Normal"));
        assert!(heading.line_spacing.is_some());

        let normal = sheet.get("Normal").expect("normal style");
        assert_eq!(normal.run.font.as_deref(), Some("Times New Roman"));
        assert_eq!(normal.run.size_half_points, Some(24));
        assert_eq!(sheet.get("Strong").map(|s| s.kind), Some(StyleKind::Character));
    }
}
