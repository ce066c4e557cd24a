#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Builds minimal `.docx` packages for tests.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    styles: Vec<String>,
    footnotes: Vec<String>,
    comments: Option<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw body XML.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// A paragraph with one run per `(text, font)`; `style` is a paragraph style id.
    pub fn paragraph(self, style: Option<&str>, runs: &[(&str, Option<&str>)]) -> Self {
        let ppr = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, s))
            .unwrap_or_default();
        let runs: String = runs.iter().map(|(text, font)| run(text, *font)).collect();
        self.raw(&format!("<w:p>{}{}</w:p>", ppr, runs))
    }

    pub fn text(self, text: &str) -> Self {
        self.paragraph(None, &[(text, None)])
    }

    pub fn table(self, rows: &[&[&str]]) -> Self {
        let rows: String = rows
            .iter()
            .map(|cells| {
                let cells: String = cells
                    .iter()
                    .map(|text| format!("<w:tc><w:p>{}</w:p></w:tc>", run(text, None)))
                    .collect();
                format!("<w:tr>{}</w:tr>", cells)
            })
            .collect();
        self.raw(&format!("<w:tbl>{}</w:tbl>", rows))
    }

    /// Final section properties with margins in twips: left, right, top, bottom.
    pub fn margins(self, left: i64, right: i64, top: i64, bottom: i64) -> Self {
        self.raw(&format!(
            r#"<w:sectPr><w:pgMar w:left="{}" w:right="{}" w:top="{}" w:bottom="{}"/></w:sectPr>"#,
            left, right, top, bottom
        ))
    }

    /// A paragraph style; `name` as stored in styles.xml (e.g. `heading 1`).
    pub fn style(mut self, id: &str, name: &str, font: Option<&str>) -> Self {
        let rpr = font
            .map(|f| format!(r#"<w:rPr><w:rFonts w:ascii="{0}" w:hAnsi="{0}"/></w:rPr>"#, f))
            .unwrap_or_default();
        self.styles.push(format!(
            r#"<w:style w:type="paragraph" w:styleId="{}"><w:name w:val="{}"/>{}</w:style>"#,
            id, name, rpr
        ));
        self
    }

    pub fn footnote(mut self, text: &str) -> Self {
        let id = self.footnotes.len() + 1;
        self.footnotes.push(format!(
            r#"<w:footnote w:id="{}"><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:footnote>"#,
            id, text
        ));
        self
    }

    /// An existing comments part with one comment of the given id.
    pub fn existing_comment(mut self, id: u32) -> Self {
        self.comments = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:comments xmlns:w="{}"><w:comment w:id="{}" w:author="Reviewer"><w:p><w:r><w:t>earlier</w:t></w:r></w:p></w:comment></w:comments>"#,
            W_NS, id
        ));
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut parts: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/document.xml", self.document_xml()),
        ];
        if !self.styles.is_empty() {
            parts.push((
                "word/styles.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{}">{}</w:styles>"#,
                    W_NS,
                    self.styles.concat()
                ),
            ));
        }
        if !self.footnotes.is_empty() {
            parts.push((
                "word/footnotes.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:footnotes xmlns:w="{}"><w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>{}</w:footnotes>"#,
                    W_NS,
                    self.footnotes.concat()
                ),
            ));
        }
        if let Some(comments) = &self.comments {
            parts.push(("word/comments.xml", comments.clone()));
        }

        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn run(text: &str, font: Option<&str>) -> String {
    let rpr = font
        .map(|f| format!(r#"<w:rPr><w:rFonts w:ascii="{0}" w:hAnsi="{0}"/></w:rPr>"#, f))
        .unwrap_or_default();
    format!(r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#, rpr, text)
}

/// Reads one part of a written package.
pub fn read_part(path: &Path, name: &str) -> Option<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut text = String::new();
    std::io::Read::read_to_string(&mut entry, &mut text).unwrap();
    Some(text)
}
