//! Text frames of slide shapes and notes bodies.
//!
//! Text is read straight from the part XML with a streaming scan. Every run
//! remembers the byte range of its `<a:t>` content, so a run can be rewritten
//! by splicing new escaped text into that range while every other byte of
//! the part stays as it was.

use crate::ooxml::error::Result;
use memchr::memrchr;
use quick_xml::Reader;
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use std::ops::Range;

/// Which text frames of a part to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextScope {
    /// The text body of every `p:sp` directly inside the slide's `p:spTree`.
    ///
    /// Shapes nested in groups, tables and other graphic frames are not visited.
    SlideShapes,
    /// The text body of the first body placeholder of a notes slide.
    NotesBody,
}

/// A run of text with uniform formatting (`a:r`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    text: String,
    /// Byte range of the raw `a:t` content in the part
    span: Range<usize>,
}

impl Run {
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Content of a paragraph in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPiece {
    Run(Run),
    /// Text of a field (`a:fld`), such as a slide number
    Field(String),
    /// Soft line break (`a:br`)
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pieces: Vec<TextPiece>,
}

impl Paragraph {
    pub fn pieces(&self) -> &[TextPiece] {
        &self.pieces
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.pieces.iter().filter_map(|piece| match piece {
            TextPiece::Run(run) => Some(run),
            _ => None,
        })
    }

    /// Paragraph text; line breaks become a vertical tab (`\u{b}`).
    pub fn text(&self) -> String {
        let mut text = String::new();
        for piece in &self.pieces {
            match piece {
                TextPiece::Run(run) => text.push_str(&run.text),
                TextPiece::Field(field) => text.push_str(field),
                TextPiece::Break => text.push('\u{b}'),
            }
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(Paragraph::runs)
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of [`rewrite_runs`].
#[derive(Debug)]
pub struct RunEdits {
    pub xml: Vec<u8>,
    pub runs_changed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    CSld,
    SpTree,
    Sp,
    NvSpPr,
    NvPr,
    TxBody,
    P,
    R,
    Fld,
    Other,
}

impl Tag {
    fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"cSld" => Tag::CSld,
            b"spTree" => Tag::SpTree,
            b"sp" => Tag::Sp,
            b"nvSpPr" => Tag::NvSpPr,
            b"nvPr" => Tag::NvPr,
            b"txBody" => Tag::TxBody,
            b"p" => Tag::P,
            b"r" => Tag::R,
            b"fld" => Tag::Fld,
            _ => Tag::Other,
        }
    }
}

/// Element path tests used while scanning.
struct Path(Vec<Tag>);

impl Path {
    fn ends_with(&self, tail: &[Tag]) -> bool {
        self.0.ends_with(tail)
    }

    /// Inside a top-level shape, `rest` being the path below `p:sp`.
    fn in_shape(&self, rest: &[Tag]) -> bool {
        let len = self.0.len();
        len >= rest.len() + 3 && {
            let shape_at = len - rest.len() - 3;
            self.0[shape_at..shape_at + 3] == [Tag::CSld, Tag::SpTree, Tag::Sp]
                && self.0[shape_at + 3..] == *rest
        }
    }
}

/// Run or field whose `a:t` is being read.
enum Pending {
    Run { text: String, span: Range<usize> },
    Field(String),
}

#[derive(Default)]
struct Scan {
    frames: Vec<TextFrame>,
    frame: Option<TextFrame>,
    pending: Option<Pending>,
    text_start: Option<usize>,
    /// Current shape is the notes body placeholder
    shape_is_body: bool,
    body_claimed: bool,
}

/// Collect the text frames of `xml` selected by `scope`.
pub fn text_frames(xml: &[u8], scope: TextScope) -> Result<Vec<TextFrame>> {
    let mut reader = Reader::from_reader(xml);
    let mut path = Path(Vec::with_capacity(16));
    let mut scan = Scan::default();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let pos = reader.buffer_position() as usize;
        match event {
            Event::Start(ref e) => {
                scan.open(&path, e, scope, pos, false)?;
                path.0.push(Tag::from_local_name(e.local_name().as_ref()));
            },
            Event::Empty(ref e) => scan.open(&path, e, scope, pos, true)?,
            Event::End(ref e) => {
                path.0.pop();
                scan.close(&path, e.local_name().as_ref(), xml, pos)?;
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(scan.frames)
}

impl Scan {
    fn open(
        &mut self,
        path: &Path,
        e: &BytesStart<'_>,
        scope: TextScope,
        pos: usize,
        empty: bool,
    ) -> Result<()> {
        match e.local_name().as_ref() {
            b"sp" if path.ends_with(&[Tag::CSld, Tag::SpTree]) => {
                self.shape_is_body = false;
            },
            b"ph" if scope == TextScope::NotesBody
                && !self.body_claimed
                && path.in_shape(&[Tag::NvSpPr, Tag::NvPr]) =>
            {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"type" && attr.value.as_ref() == b"body" {
                        self.shape_is_body = true;
                        self.body_claimed = true;
                    }
                }
            },
            b"txBody" if path.in_shape(&[]) => {
                let wanted = match scope {
                    TextScope::SlideShapes => true,
                    TextScope::NotesBody => self.shape_is_body,
                };
                if wanted {
                    if empty {
                        self.frames.push(TextFrame::default());
                    } else {
                        self.frame = Some(TextFrame::default());
                    }
                }
            },
            b"p" if path.in_shape(&[Tag::TxBody]) => {
                if let Some(frame) = self.frame.as_mut() {
                    frame.paragraphs.push(Paragraph::default());
                }
            },
            b"r" if !empty && path.in_shape(&[Tag::TxBody, Tag::P]) && self.frame.is_some() => {
                self.pending = Some(Pending::Run {
                    text: String::new(),
                    span: pos..pos,
                });
            },
            b"r" if path.in_shape(&[Tag::TxBody, Tag::P]) => {
                self.push_piece(TextPiece::Run(Run {
                    text: String::new(),
                    span: pos..pos,
                }));
            },
            b"fld" if !empty && path.in_shape(&[Tag::TxBody, Tag::P]) && self.frame.is_some() => {
                self.pending = Some(Pending::Field(String::new()));
            },
            b"br" if path.in_shape(&[Tag::TxBody, Tag::P]) => {
                self.push_piece(TextPiece::Break);
            },
            b"t" if !empty && self.pending.is_some() => {
                if path.in_shape(&[Tag::TxBody, Tag::P, Tag::R])
                    || path.in_shape(&[Tag::TxBody, Tag::P, Tag::Fld])
                {
                    self.text_start = Some(pos);
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn close(&mut self, path: &Path, local_name: &[u8], xml: &[u8], pos: usize) -> Result<()> {
        match local_name {
            b"t" => {
                if let Some(start) = self.text_start.take() {
                    let end = memrchr(b'<', &xml[..pos]).unwrap_or(start).max(start);
                    let text = unescape(std::str::from_utf8(&xml[start..end])?)?.into_owned();
                    match self.pending.as_mut() {
                        Some(Pending::Run { text: run_text, span }) => {
                            *run_text = text;
                            *span = start..end;
                        },
                        Some(Pending::Field(field)) => *field = text,
                        None => {},
                    }
                }
            },
            b"r" | b"fld" if path.in_shape(&[Tag::TxBody, Tag::P]) => {
                match self.pending.take() {
                    Some(Pending::Run { text, span }) => {
                        self.push_piece(TextPiece::Run(Run { text, span }))
                    },
                    Some(Pending::Field(text)) => self.push_piece(TextPiece::Field(text)),
                    None => {},
                }
            },
            b"txBody" if path.in_shape(&[]) => {
                if let Some(frame) = self.frame.take() {
                    self.frames.push(frame);
                }
            },
            b"sp" if path.ends_with(&[Tag::CSld, Tag::SpTree]) => {
                self.shape_is_body = false;
            },
            _ => {},
        }
        Ok(())
    }

    fn push_piece(&mut self, piece: TextPiece) {
        if let Some(paragraph) = self
            .frame
            .as_mut()
            .and_then(|frame| frame.paragraphs.last_mut())
        {
            paragraph.pieces.push(piece);
        }
    }
}

/// Rewrite the text of every non-empty run in the frames selected by `scope`.
///
/// `edit` receives the current run text and returns the replacement, or
/// `None` to leave the run alone. Returns `None` when nothing changed.
pub fn rewrite_runs<F>(xml: &[u8], scope: TextScope, mut edit: F) -> Result<Option<RunEdits>>
where
    F: FnMut(&str) -> Option<String>,
{
    let frames = text_frames(xml, scope)?;
    let mut edits = Vec::new();

    for run in frames.iter().flat_map(TextFrame::runs) {
        if run.text.is_empty() {
            continue;
        }
        if let Some(text) = edit(&run.text)
            && text != run.text
        {
            edits.push((run.span.clone(), escape_run_text(&text).into_bytes()));
        }
    }

    if edits.is_empty() {
        return Ok(None);
    }
    let runs_changed = edits.len();
    Ok(Some(RunEdits {
        xml: splice(xml, edits),
        runs_changed,
    }))
}

/// Escape text for an `<a:t>` element.
///
/// C0 controls other than tab, LF and CR cannot appear in XML 1.0; Office
/// writes them as `_xHHHH_`, and so do we.
fn escape_run_text(text: &str) -> String {
    let escaped = partial_escape(text);
    if !escaped.chars().any(is_restricted_control) {
        return escaped.into_owned();
    }
    let mut out = String::with_capacity(escaped.len() + 16);
    for c in escaped.chars() {
        if is_restricted_control(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

#[inline]
fn is_restricted_control(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

/// Replace byte ranges of `xml`. Ranges must not overlap; order does not matter.
pub(crate) fn splice(xml: &[u8], mut edits: Vec<(Range<usize>, Vec<u8>)>) -> Vec<u8> {
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = Vec::with_capacity(xml.len() + edits.iter().map(|(_, b)| b.len()).sum::<usize>());
    let mut cursor = 0;
    for (range, bytes) in edits {
        if range.start < cursor || range.end > xml.len() {
            continue;
        }
        out.extend_from_slice(&xml[cursor..range.start]);
        out.extend_from_slice(&bytes);
        cursor = range.end;
    }
    out.extend_from_slice(&xml[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Hello {{COMPANY_NAME}}, total: {{SETUP_FEE}}</a:t></a:r></a:p>
<a:p><a:r><a:t>R&amp;D</a:t></a:r><a:br/><a:fld id="{1}" type="slidenum"><a:t>7</a:t></a:fld><a:r><a:t/></a:r></a:p></p:txBody></p:sp>
<p:grpSp><p:sp><p:txBody><a:p><a:r><a:t>{{COMPANY_NAME}} in group</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Empty"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody/></p:sp>
</p:spTree></p:cSld></p:sld>"#;

    const NOTES: &str = r#"<p:notes xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image"/><p:cNvSpPr/><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>not notes</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>intro [[tag:pricing]]</a:t></a:r></a:p><a:p><a:r><a:t>[[tag:legal]]</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="4" name="Second body"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="2"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>ignored</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:notes>"#;

    #[test]
    fn test_slide_frames_top_level_only() {
        let frames = text_frames(SLIDE.as_bytes(), TextScope::SlideShapes).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0].text(),
            "Hello {{COMPANY_NAME}}, total: {{SETUP_FEE}}\nR&D\u{b}7"
        );
        assert!(frames[1].paragraphs().is_empty());
    }

    #[test]
    fn test_paragraph_pieces() {
        let frames = text_frames(SLIDE.as_bytes(), TextScope::SlideShapes).unwrap();
        let second = &frames[0].paragraphs()[1];
        assert_eq!(second.pieces().len(), 4);
        assert!(matches!(second.pieces()[1], TextPiece::Break));
        assert_eq!(second.pieces()[2], TextPiece::Field("7".to_string()));
        assert_eq!(second.runs().map(Run::text).collect::<Vec<_>>(), ["R&D", ""]);
    }

    #[test]
    fn test_notes_body_frame() {
        let frames = text_frames(NOTES.as_bytes(), TextScope::NotesBody).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].text(), "intro [[tag:pricing]]\n[[tag:legal]]");
    }

    #[test]
    fn test_notes_without_body_placeholder() {
        let xml = r#"<p:notes><p:cSld><p:spTree><p:sp><p:nvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>x</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#;
        let frames = text_frames(xml.as_bytes(), TextScope::NotesBody).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_rewrite_runs_preserves_other_bytes() {
        let edits = rewrite_runs(SLIDE.as_bytes(), TextScope::SlideShapes, |text| {
            Some(text.replace("{{COMPANY_NAME}}", "Acme & Sons"))
        })
        .unwrap()
        .unwrap();

        assert_eq!(edits.runs_changed, 1);
        let xml = String::from_utf8(edits.xml).unwrap();
        assert!(xml.contains(r#"<a:rPr lang="en-US" b="1"/><a:t>Hello Acme &amp; Sons, total: {{SETUP_FEE}}</a:t>"#));
        // Group members are outside the scope.
        assert!(xml.contains("{{COMPANY_NAME}} in group"));
        assert_eq!(
            xml.replace("Hello Acme &amp; Sons,", "Hello {{COMPANY_NAME}},"),
            SLIDE
        );
    }

    #[test]
    fn test_rewrite_without_changes() {
        let edits = rewrite_runs(SLIDE.as_bytes(), TextScope::SlideShapes, |text| {
            Some(text.to_string())
        })
        .unwrap();
        assert!(edits.is_none());
    }

    #[test]
    fn test_rewrite_notes_body_only() {
        let edits = rewrite_runs(NOTES.as_bytes(), TextScope::NotesBody, |text| {
            Some(text.to_uppercase())
        })
        .unwrap()
        .unwrap();
        assert_eq!(edits.runs_changed, 2);
        let xml = String::from_utf8(edits.xml).unwrap();
        assert!(xml.contains("INTRO [[TAG:PRICING]]"));
        assert!(xml.contains("not notes"));
        assert!(xml.contains("ignored"));
    }

    #[test]
    fn test_rewrite_escapes_control_characters() {
        let edits = rewrite_runs(SLIDE.as_bytes(), TextScope::SlideShapes, |text| {
            text.contains("{{COMPANY_NAME}}")
                .then(|| text.replace("{{COMPANY_NAME}}", "Acme\u{1}\u{b}\tInc <Ltd>"))
        })
        .unwrap()
        .unwrap();

        let xml = String::from_utf8(edits.xml).unwrap();
        assert!(!xml.contains('\u{1}'));
        assert!(!xml.contains('\u{b}'));
        assert!(xml.contains("<a:t>Hello Acme_x0001__x000B_\tInc &lt;Ltd&gt;, total: {{SETUP_FEE}}</a:t>"));

        let frames = text_frames(xml.as_bytes(), TextScope::SlideShapes).unwrap();
        assert!(frames[0].text().starts_with("Hello Acme_x0001__x000B_\tInc <Ltd>,"));
    }

    const SPLIT_TOKEN: &str = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Body"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Dear {{COMPANY_</a:t></a:r><a:r><a:rPr lang="en-US" i="1"/><a:t>NAME}}, fee {{SETUP_FEE}}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_token_split_across_runs_is_not_replaced() {
        let mut map = crate::template::ReplacementMap::new();
        map.insert_placeholder("COMPANY_NAME", "Acme");
        map.insert_placeholder("SETUP_FEE", "5000");

        let frames = text_frames(SPLIT_TOKEN.as_bytes(), TextScope::SlideShapes).unwrap();
        let runs: Vec<&str> = frames[0].runs().map(Run::text).collect();
        assert_eq!(runs, ["Dear {{COMPANY_", "NAME}}, fee {{SETUP_FEE}}"]);

        let edits = rewrite_runs(SPLIT_TOKEN.as_bytes(), TextScope::SlideShapes, |text| map.apply(text))
            .unwrap()
            .unwrap();
        assert_eq!(edits.runs_changed, 1);

        let xml = String::from_utf8(edits.xml).unwrap();
        assert!(xml.contains(r#"<a:r><a:rPr lang="en-US" b="1"/><a:t>Dear {{COMPANY_</a:t></a:r>"#));
        assert!(xml.contains(r#"<a:r><a:rPr lang="en-US" i="1"/><a:t>NAME}}, fee 5000</a:t></a:r>"#));
        assert_eq!(xml.replace("fee 5000", "fee {{SETUP_FEE}}"), SPLIT_TOKEN);
    }

    #[test]
    fn test_splice() {
        let out = splice(b"0123456789", vec![(6..8, b"x".to_vec()), (1..3, Vec::new())]);
        assert_eq!(out, b"0345x89");
    }
}
