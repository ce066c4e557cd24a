//! Package parts touched when comments are added: the comments part, the
//! document relationships and the content types.

use crate::docx::package::{COMMENTS_PART, CONTENT_TYPES_PART, DOCUMENT_RELS_PART};
use crate::docx::DocxPackage;
use crate::error::Error;
use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const COMMENTS_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
const COMMENTS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";

/// A review comment to add to the comments part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub id: u32,
    pub author: String,
    pub text: String,
}

impl NewComment {
    fn initials(&self) -> String {
        self.author
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}

/// Highest `w:id` among the existing comments.
pub fn max_comment_id(comments_xml: &str) -> Result<Option<u32>> {
    let xml = roxmltree::Document::parse(comments_xml)
        .map_err(|e| Error::Xml(format!("{}: {}", COMMENTS_PART, e)))?;
    Ok(xml
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "comment")
        .filter_map(|n| n.attribute((W_NS, "id")))
        .filter_map(|id| id.parse().ok())
        .max())
}

/// A fresh comments part holding `comments`.
pub fn new_comments_part(comments: &[NewComment]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_declaration(&mut writer, COMMENTS_PART)?;
    let mut root = BytesStart::new("w:comments");
    root.push_attribute(("xmlns:w", W_NS));
    emit(&mut writer, COMMENTS_PART, Event::Start(root))?;
    for comment in comments {
        write_comment(&mut writer, "w:", comment)?;
    }
    emit(&mut writer, COMMENTS_PART, Event::End(BytesEnd::new("w:comments")))?;
    into_string(writer, COMMENTS_PART)
}

/// Appends `comments` to an existing comments part.
pub fn append_comments(comments_xml: &str, comments: &[NewComment]) -> Result<String> {
    append_to_root(comments_xml, COMMENTS_PART, |writer, prefix| {
        comments
            .iter()
            .try_for_each(|comment| write_comment(writer, prefix, comment))
    })
}

fn write_comment(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    prefix: &str,
    comment: &NewComment,
) -> Result<()> {
    let tag = |local: &str| format!("{prefix}{local}");

    let mut element = BytesStart::new(tag("comment"));
    element.push_attribute((tag("id").as_str(), comment.id.to_string().as_str()));
    element.push_attribute((tag("author").as_str(), comment.author.as_str()));
    element.push_attribute((tag("initials").as_str(), comment.initials().as_str()));
    emit(writer, COMMENTS_PART, Event::Start(element))?;

    for local in ["p", "r"] {
        emit(writer, COMMENTS_PART, Event::Start(BytesStart::new(tag(local))))?;
    }
    let mut text = BytesStart::new(tag("t"));
    text.push_attribute(("xml:space", "preserve"));
    emit(writer, COMMENTS_PART, Event::Start(text))?;
    emit(writer, COMMENTS_PART, Event::Text(BytesText::new(&comment.text)))?;
    for local in ["t", "r", "p", "comment"] {
        emit(writer, COMMENTS_PART, Event::End(BytesEnd::new(tag(local))))?;
    }
    Ok(())
}

/// Adds the comments relationship unless the document already has one.
/// Returns `None` when nothing changes.
pub fn ensure_comments_relationship(rels_xml: Option<&str>) -> Result<Option<String>> {
    let Some(rels_xml) = rels_xml else {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_declaration(&mut writer, DOCUMENT_RELS_PART)?;
        let mut root = BytesStart::new("Relationships");
        root.push_attribute(("xmlns", RELS_NS));
        emit(&mut writer, DOCUMENT_RELS_PART, Event::Start(root))?;
        write_relationship(&mut writer, "", "rId1")?;
        emit(&mut writer, DOCUMENT_RELS_PART, Event::End(BytesEnd::new("Relationships")))?;
        return into_string(writer, DOCUMENT_RELS_PART).map(Some);
    };

    let xml = roxmltree::Document::parse(rels_xml)
        .map_err(|e| Error::Xml(format!("{}: {}", DOCUMENT_RELS_PART, e)))?;
    let relationships: Vec<_> = xml
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .collect();
    if relationships
        .iter()
        .any(|n| n.attribute("Type") == Some(COMMENTS_REL_TYPE))
    {
        return Ok(None);
    }

    let taken: Vec<&str> = relationships.iter().filter_map(|n| n.attribute("Id")).collect();
    let id = (1..)
        .map(|n| format!("rId{}", n))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| "rIdComments".to_string());

    append_to_root(rels_xml, DOCUMENT_RELS_PART, |writer, prefix| {
        write_relationship(writer, prefix, &id)
    })
    .map(Some)
}

fn write_relationship(writer: &mut Writer<Cursor<Vec<u8>>>, prefix: &str, id: &str) -> Result<()> {
    let mut element = BytesStart::new(format!("{prefix}Relationship"));
    element.push_attribute(("Id", id));
    element.push_attribute(("Type", COMMENTS_REL_TYPE));
    element.push_attribute(("Target", "comments.xml"));
    emit(writer, DOCUMENT_RELS_PART, Event::Empty(element))
}

/// Adds the content-type override of the comments part unless present.
pub fn ensure_comments_override(content_types_xml: &str) -> Result<Option<String>> {
    let part_name = format!("/{}", COMMENTS_PART);
    let xml = roxmltree::Document::parse(content_types_xml)
        .map_err(|e| Error::Xml(format!("{}: {}", CONTENT_TYPES_PART, e)))?;
    let present = xml
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Override")
        .any(|n| n.attribute("PartName") == Some(part_name.as_str()));
    if present {
        return Ok(None);
    }

    append_to_root(content_types_xml, CONTENT_TYPES_PART, |writer, prefix| {
        let mut element = BytesStart::new(format!("{prefix}Override"));
        element.push_attribute(("PartName", part_name.as_str()));
        element.push_attribute(("ContentType", COMMENTS_CONTENT_TYPE));
        emit(writer, CONTENT_TYPES_PART, Event::Empty(element))
    })
    .map(Some)
}

/// Copies `xml` and lets `write_children` add elements right before the root closes.
/// The callback gets the root element's prefix (`w:` or empty).
fn append_to_root<F>(xml: &str, part: &str, mut write_children: F) -> Result<String>
where
    F: FnMut(&mut Writer<Cursor<Vec<u8>>>, &str) -> Result<()>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut depth = 0usize;
    let mut prefix = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Xml(format!("{}: {}", part, e)))?;
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    prefix = prefix_of(&e);
                }
                depth += 1;
                emit(&mut writer, part, Event::Start(e))?;
            }
            Event::Empty(e) if depth == 0 => {
                prefix = prefix_of(&e);
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                emit(&mut writer, part, Event::Start(e))?;
                write_children(&mut writer, &prefix)?;
                emit(&mut writer, part, Event::End(BytesEnd::new(name)))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    write_children(&mut writer, &prefix)?;
                }
                emit(&mut writer, part, Event::End(e))?;
            }
            Event::Eof => break,
            other => emit(&mut writer, part, other)?,
        }
    }

    into_string(writer, part)
}

/// Writes the package to `output`: every entry of `package` in order, with
/// `replacements` substituted by name and the remaining ones appended as new parts.
pub fn write_package<R: Read + Seek, P: AsRef<Path>>(
    package: &mut DocxPackage<R>,
    output: P,
    mut replacements: BTreeMap<String, Vec<u8>>,
) -> Result<()> {
    let file = File::create(output.as_ref())?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..package.len() {
        let (name, is_dir, bytes) = package.entry_at(index)?;
        if is_dir {
            zip.add_directory(name, options)?;
            continue;
        }
        let data = replacements.remove(&name).unwrap_or(bytes);
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }

    for (name, data) in replacements {
        log::debug!("Adding part {}", name);
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?.flush()?;
    Ok(())
}

fn prefix_of(e: &BytesStart<'_>) -> String {
    e.name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

fn write_declaration(writer: &mut Writer<Cursor<Vec<u8>>>, part: &str) -> Result<()> {
    emit(
        writer,
        part,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, part: &str, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("{}: {}", part, e)))
}

fn into_string(writer: Writer<Cursor<Vec<u8>>>, part: &str) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::Xml(format!("{}: {}", part, e)))
}
