/// Parts for PowerPoint presentation documents.
///
/// Wrapper types over the XML parts of a .pptx package.
pub mod presentation;

pub use presentation::{PresentationPart, SectionSlideRef, SlideIdEntry, SlideIdList};
