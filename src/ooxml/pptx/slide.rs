/// Slides of a presentation and their notes.
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::pptx::parts::SlideIdEntry;
use crate::ooxml::pptx::text::{TextFrame, TextScope, text_frames};

/// A slide in a presentation.
///
/// A slide is a borrowed view identified by its position in the slide
/// sequence at the time the list was read. Positions renumber after slides
/// are removed, so a `Slide` should not outlive the edit that follows it.
///
/// # Examples
///
/// ```rust,no_run
/// use deckrender::ooxml::pptx::Package;
///
/// let pkg = Package::open("template.pptx")?;
/// for slide in pkg.presentation()?.slides()? {
///     println!("{} {}", slide.index(), slide.text()?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Slide<'a> {
    index: usize,
    entry: SlideIdEntry,
    partname: PackURI,
    package: &'a OpcPackage,
}

impl<'a> Slide<'a> {
    pub(crate) fn new(
        index: usize,
        entry: SlideIdEntry,
        partname: PackURI,
        package: &'a OpcPackage,
    ) -> Self {
        Self {
            index,
            entry,
            partname,
            package,
        }
    }

    /// Zero-based position in the slide sequence.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The `id` of the slide's `p:sldId` entry.
    #[inline]
    pub fn slide_id(&self) -> Option<u32> {
        self.entry.id
    }

    /// Relationship id from the presentation part to this slide.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.entry.r_id
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    pub fn part(&self) -> Result<&'a dyn Part> {
        Ok(self.package.get_part(&self.partname)?)
    }

    /// Part name of the notes slide, if the slide has one.
    pub fn notes_partname(&self) -> Result<Option<PackURI>> {
        Ok(self
            .package
            .related_partname_by_type(&self.partname, relationship_type::NOTES_SLIDE)?)
    }

    pub fn has_notes(&self) -> Result<bool> {
        Ok(self.notes_partname()?.is_some())
    }

    /// Text of the notes body placeholder.
    ///
    /// Returns `None` when the slide has no notes slide, or when the notes
    /// slide has no body placeholder.
    pub fn notes_text(&self) -> Result<Option<String>> {
        let Some(notes) = self.notes_partname()? else {
            return Ok(None);
        };
        let part = self.package.get_part(&notes)?;
        let frames = text_frames(part.blob(), TextScope::NotesBody)?;
        Ok(frames.first().map(TextFrame::text))
    }

    /// Text frames of the slide's top-level shapes, in z-order.
    pub fn text_frames(&self) -> Result<Vec<TextFrame>> {
        text_frames(self.part()?.blob(), TextScope::SlideShapes)
    }

    /// All shape text of the slide, one frame per line.
    pub fn text(&self) -> Result<String> {
        Ok(self
            .text_frames()?
            .iter()
            .map(TextFrame::text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl std::fmt::Debug for Slide<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slide")
            .field("index", &self.index)
            .field("slide_id", &self.entry.id)
            .field("partname", &self.partname)
            .finish()
    }
}
