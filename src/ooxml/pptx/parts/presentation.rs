/// Presentation part - the main part in a .pptx package.
///
/// Corresponds to `/ppt/presentation.xml` in the package.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::part::Part;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::ops::Range;

/// One `<p:sldId>` entry of `<p:sldIdLst>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIdEntry {
    /// Numeric slide id (`id` attribute), stable across reordering
    pub id: Option<u32>,
    /// Relationship from the presentation part to the slide part
    pub r_id: String,
    /// Byte range of the whole element in the part
    pub span: Range<usize>,
}

/// A slide reference inside a `<p14:section>` of the section list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSlideRef {
    pub id: u32,
    pub span: Range<usize>,
}

/// Snapshot of the slide ordering of a presentation part.
#[derive(Debug, Clone, Default)]
pub struct SlideIdList {
    /// Entries in presentation order
    pub entries: Vec<SlideIdEntry>,
    pub section_refs: Vec<SectionSlideRef>,
}

/// The main presentation part.
///
/// This part holds presentation-level properties and the ordered list of
/// slide references.
pub struct PresentationPart<'a> {
    part: &'a dyn Part,
}

impl<'a> PresentationPart<'a> {
    pub fn from_part(part: &'a dyn Part) -> Self {
        Self { part }
    }

    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }

    /// Get the number of slides in the presentation.
    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slide_id_list()?.entries.len())
    }

    /// Parse `<p:sldIdLst>` and the section list in one pass.
    pub fn slide_id_list(&self) -> Result<SlideIdList> {
        parse_slide_id_list(self.part.blob())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    SlideIdList,
    Section,
    SectionSlideIdList,
    Other,
}

pub(crate) fn parse_slide_id_list(xml: &[u8]) -> Result<SlideIdList> {
    let mut reader = Reader::from_reader(xml);
    let mut list = SlideIdList::default();
    let mut stack: Vec<Container> = Vec::with_capacity(8);
    // Start of a non-empty <p:sldId> waiting for its end tag
    let mut open_entry: Option<(Option<u32>, String, usize)> = None;
    let mut open_section_ref: Option<(u32, usize)> = None;
    let mut buf = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event_into(&mut buf)?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let parent = stack.last().copied();

                if local.as_ref() == b"sldId" {
                    match parent {
                        Some(Container::SlideIdList) => {
                            let (id, r_id) = slide_id_attrs(e)?;
                            let r_id = r_id
                                .ok_or_else(|| OoxmlError::Xml("p:sldId without r:id".to_string()))?;
                            if is_empty {
                                list.entries.push(SlideIdEntry {
                                    id,
                                    r_id,
                                    span: start..end,
                                });
                            } else {
                                open_entry = Some((id, r_id, start));
                            }
                        },
                        Some(Container::SectionSlideIdList) => {
                            if let (Some(id), _) = slide_id_attrs(e)? {
                                if is_empty {
                                    list.section_refs.push(SectionSlideRef {
                                        id,
                                        span: start..end,
                                    });
                                } else {
                                    open_section_ref = Some((id, start));
                                }
                            }
                        },
                        _ => {},
                    }
                }

                if !is_empty {
                    let container = match (local.as_ref(), parent) {
                        (b"sldIdLst", Some(Container::Section)) => Container::SectionSlideIdList,
                        (b"sldIdLst", _) if stack.len() == 1 => Container::SlideIdList,
                        (b"section", _) => Container::Section,
                        _ => Container::Other,
                    };
                    stack.push(container);
                }
            },
            Event::End(ref e) => {
                stack.pop();
                if e.local_name().as_ref() == b"sldId" {
                    match stack.last() {
                        Some(Container::SlideIdList) => {
                            if let Some((id, r_id, entry_start)) = open_entry.take() {
                                list.entries.push(SlideIdEntry {
                                    id,
                                    r_id,
                                    span: entry_start..end,
                                });
                            }
                        },
                        Some(Container::SectionSlideIdList) => {
                            if let Some((id, ref_start)) = open_section_ref.take() {
                                list.section_refs.push(SectionSlideRef {
                                    id,
                                    span: ref_start..end,
                                });
                            }
                        },
                        _ => {},
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(list)
}

/// `id` and `r:id` of a `sldId` element.
fn slide_id_attrs(e: &BytesStart<'_>) -> Result<(Option<u32>, Option<String>)> {
    let mut id = None;
    let mut r_id = None;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != b"id" {
            continue;
        }
        let value = std::str::from_utf8(&attr.value)?;
        if attr.key.prefix().is_some() {
            r_id = Some(value.to_string());
        } else {
            id = value.parse::<u32>().ok();
        }
    }
    Ok((id, r_id))
}
