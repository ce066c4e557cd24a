//! Streaming rewrite of `word/document.xml`: highlights marked runs and wraps
//! each of them in a comment range.

use crate::docx::package::DOCUMENT_PART;
use crate::error::Error;
use crate::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Cursor;

/// Position of a run: index of its body-level paragraph and of the run among
/// the paragraph's direct `w:r` children.
pub type RunPosition = (usize, usize);

/// `w:rPr` children that follow `w:highlight` in schema order.
const AFTER_HIGHLIGHT: &[&[u8]] = &[
    b"u",
    b"effect",
    b"bdr",
    b"shd",
    b"fitText",
    b"vertAlign",
    b"rtl",
    b"cs",
    b"em",
    b"lang",
    b"eastAsianLayout",
    b"specVanish",
    b"oMath",
    b"rPrChange",
];

/// Rewrites `xml`, giving every run in `marks` a highlight and the comment id it maps to.
pub fn rewrite_document(
    xml: &str,
    marks: &BTreeMap<RunPosition, u32>,
    highlight: &str,
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut rewriter = DocumentRewriter {
        writer: Writer::new(Cursor::new(Vec::new())),
        marks,
        highlight,
        stack: Vec::new(),
        paragraph_count: 0,
        paragraph: None,
        run: None,
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Xml(format!("{}: {}", DOCUMENT_PART, e)))?;
        match event {
            Event::Start(e) => rewriter.start(e)?,
            Event::Empty(e) => rewriter.empty(e)?,
            Event::End(e) => rewriter.end(e)?,
            Event::Eof => break,
            other => rewriter.other(other)?,
        }
    }

    if let Some(run) = &rewriter.run {
        return Err(Error::Xml(format!(
            "{}: unterminated run for comment {}",
            DOCUMENT_PART, run.comment_id
        )));
    }

    let bytes = rewriter.writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| Error::Xml(format!("{}: {}", DOCUMENT_PART, e)))
}

struct OpenParagraph {
    index: usize,
    depth: usize,
    runs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStage {
    /// Right after `<w:r>`; the first child decides whether `w:rPr` exists.
    AwaitingProperties,
    /// Inside the run's own `w:rPr`.
    InProperties {
        inserted: bool,
        /// Depth of an existing `w:highlight` being dropped.
        skipping: Option<usize>,
    },
    Body,
}

struct MarkedRun {
    comment_id: u32,
    depth: usize,
    prefix: String,
    stage: RunStage,
}

struct DocumentRewriter<'m> {
    writer: Writer<Cursor<Vec<u8>>>,
    marks: &'m BTreeMap<RunPosition, u32>,
    highlight: &'m str,
    /// Local names of the open elements.
    stack: Vec<Vec<u8>>,
    paragraph_count: usize,
    paragraph: Option<OpenParagraph>,
    run: Option<MarkedRun>,
}

impl DocumentRewriter<'_> {
    fn start(&mut self, e: BytesStart<'_>) -> Result<()> {
        let local = e.local_name().as_ref().to_vec();
        let depth = self.stack.len();

        if let Some(run) = &mut self.run {
            match run.stage {
                RunStage::AwaitingProperties if depth == run.depth + 1 => {
                    if local == b"rPr" {
                        run.stage = RunStage::InProperties {
                            inserted: false,
                            skipping: None,
                        };
                        self.stack.push(local);
                        return self.emit(Event::Start(e));
                    }
                    self.write_new_properties()?;
                }
                RunStage::InProperties {
                    skipping: Some(_), ..
                } => {
                    self.stack.push(local);
                    return Ok(());
                }
                RunStage::InProperties { inserted, .. } if depth == run.depth + 2 => {
                    if local == b"highlight" {
                        run.stage = RunStage::InProperties {
                            inserted: true,
                            skipping: Some(depth),
                        };
                        self.stack.push(local);
                        return if inserted { Ok(()) } else { self.write_highlight() };
                    }
                    if !inserted && AFTER_HIGHLIGHT.contains(&local.as_slice()) {
                        run.stage = RunStage::InProperties {
                            inserted: true,
                            skipping: None,
                        };
                        self.write_highlight()?;
                    }
                }
                _ => {}
            }
        } else if local == b"p" && self.is_block_level() {
            self.paragraph = Some(OpenParagraph {
                index: self.paragraph_count,
                depth,
                runs: 0,
            });
            self.paragraph_count += 1;
        } else if local == b"r" {
            if let Some(comment_id) = self.next_run_mark(depth) {
                let prefix = prefix_of(&e);
                self.write_range_start(&prefix, comment_id)?;
                self.run = Some(MarkedRun {
                    comment_id,
                    depth,
                    prefix,
                    stage: RunStage::AwaitingProperties,
                });
            }
        }

        self.stack.push(local);
        self.emit(Event::Start(e))
    }

    fn empty(&mut self, e: BytesStart<'_>) -> Result<()> {
        let local = e.local_name().as_ref().to_vec();
        let depth = self.stack.len();

        if let Some(run) = &mut self.run {
            match run.stage {
                RunStage::AwaitingProperties if depth == run.depth + 1 => {
                    self.write_new_properties()?;
                    if local == b"rPr" {
                        return Ok(());
                    }
                }
                RunStage::InProperties {
                    skipping: Some(_), ..
                } => return Ok(()),
                RunStage::InProperties { inserted, .. } if depth == run.depth + 2 => {
                    let replaces = local == b"highlight";
                    if replaces || (!inserted && AFTER_HIGHLIGHT.contains(&local.as_slice())) {
                        run.stage = RunStage::InProperties {
                            inserted: true,
                            skipping: None,
                        };
                        if !inserted {
                            self.write_highlight()?;
                        }
                        if replaces {
                            return Ok(());
                        }
                    }
                }
                _ => {}
            }
            return self.emit(Event::Empty(e));
        }

        if local == b"p" && self.is_block_level() {
            // A self-closing paragraph still takes an index; it has no runs.
            self.paragraph_count += 1;
        } else if local == b"r" {
            if let Some(comment_id) = self.next_run_mark(depth) {
                let prefix = prefix_of(&e);
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                self.write_range_start(&prefix, comment_id)?;
                self.emit(Event::Start(e))?;
                self.write_properties(&prefix)?;
                self.emit(Event::End(BytesEnd::new(name)))?;
                return self.write_range_end(&prefix, comment_id);
            }
        }

        self.emit(Event::Empty(e))
    }

    fn end(&mut self, e: BytesEnd<'_>) -> Result<()> {
        self.stack.pop();
        let depth = self.stack.len();

        if let Some(run) = &mut self.run {
            let run_depth = run.depth;
            match run.stage {
                RunStage::InProperties {
                    skipping: Some(skip_depth),
                    ..
                } if depth >= skip_depth => {
                    if depth == skip_depth {
                        run.stage = RunStage::InProperties {
                            inserted: true,
                            skipping: None,
                        };
                    }
                    return Ok(());
                }
                RunStage::InProperties { inserted, .. } if depth == run_depth + 1 => {
                    run.stage = RunStage::Body;
                    if !inserted {
                        self.write_highlight()?;
                    }
                    return self.emit(Event::End(e));
                }
                RunStage::AwaitingProperties if depth == run_depth => {
                    self.write_new_properties()?;
                }
                _ => {}
            }

            if depth == run_depth {
                if let Some(run) = self.run.take() {
                    self.emit(Event::End(e))?;
                    return self.write_range_end(&run.prefix, run.comment_id);
                }
            }
        } else if self.paragraph.as_ref().is_some_and(|p| p.depth == depth) {
            self.paragraph = None;
        }

        self.emit(Event::End(e))
    }

    fn other(&mut self, event: Event<'_>) -> Result<()> {
        if let Some(MarkedRun {
            stage: RunStage::InProperties {
                skipping: Some(_), ..
            },
            ..
        }) = &self.run
        {
            return Ok(());
        }
        self.emit(event)
    }

    /// Paragraphs directly in the body or in block-level content controls.
    fn is_block_level(&self) -> bool {
        match self.stack.get(1..) {
            Some([body, controls @ ..]) if body.as_slice() == b"body" => {
                controls.chunks(2).all(|pair| match pair {
                    [sdt, content] => sdt.as_slice() == b"sdt" && content.as_slice() == b"sdtContent",
                    _ => false,
                })
            }
            _ => false,
        }
    }

    /// Counts a direct run of the open body paragraph and returns its comment id when marked.
    fn next_run_mark(&mut self, depth: usize) -> Option<u32> {
        let paragraph = self.paragraph.as_mut().filter(|p| p.depth + 1 == depth)?;
        let position = (paragraph.index, paragraph.runs);
        paragraph.runs += 1;
        self.marks.get(&position).copied()
    }

    fn write_new_properties(&mut self) -> Result<()> {
        let Some(run) = &mut self.run else {
            return Ok(());
        };
        run.stage = RunStage::Body;
        let prefix = run.prefix.clone();
        self.write_properties(&prefix)
    }

    fn write_properties(&mut self, prefix: &str) -> Result<()> {
        let name = format!("{prefix}rPr");
        self.emit(Event::Start(BytesStart::new(name.as_str())))?;
        self.write_highlight_with(prefix)?;
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn write_highlight(&mut self) -> Result<()> {
        let prefix = self
            .run
            .as_ref()
            .map(|run| run.prefix.clone())
            .unwrap_or_default();
        self.write_highlight_with(&prefix)
    }

    fn write_highlight_with(&mut self, prefix: &str) -> Result<()> {
        let mut element = BytesStart::new(format!("{prefix}highlight"));
        element.push_attribute((format!("{prefix}val").as_str(), self.highlight));
        self.emit(Event::Empty(element))
    }

    fn write_range_start(&mut self, prefix: &str, comment_id: u32) -> Result<()> {
        self.emit(Event::Empty(id_element(prefix, "commentRangeStart", comment_id)))
    }

    /// Closes the comment range and adds the run carrying the comment mark.
    fn write_range_end(&mut self, prefix: &str, comment_id: u32) -> Result<()> {
        let run = format!("{prefix}r");
        self.emit(Event::Empty(id_element(prefix, "commentRangeEnd", comment_id)))?;
        self.emit(Event::Start(BytesStart::new(run.as_str())))?;
        self.emit(Event::Empty(id_element(prefix, "commentReference", comment_id)))?;
        self.emit(Event::End(BytesEnd::new(run)))
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::Xml(format!("{}: {}", DOCUMENT_PART, e)))
    }
}

fn id_element(prefix: &str, local: &str, id: u32) -> BytesStart<'static> {
    let mut element = BytesStart::new(format!("{prefix}{local}"));
    element.push_attribute((format!("{prefix}id").as_str(), id.to_string().as_str()));
    element
}

/// `w:` for `<w:r>`, empty for an unprefixed element.
fn prefix_of(e: &BytesStart<'_>) -> String {
    e.name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}
