//! PowerPoint (.pptx) presentation support.
//!
//! A thin PresentationML layer over the OPC package:
//!
//! - `Package`: the .pptx package, with run rewriting and slide removal
//! - `Presentation`: the ordered slide list of the main part
//! - `Slide`: one slide, its top-level text frames and its notes
//! - `text`: streaming access to text frames, paragraphs and runs
//!
//! Parts are never re-serialized from a DOM. Reads scan the XML and edits
//! splice bytes, so everything the renderer does not touch is written back
//! exactly as it was read.
pub mod package;
pub mod parts;
pub mod presentation;
mod prune;
pub mod slide;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use package::Package;
pub use presentation::Presentation;
pub use slide::Slide;
pub use text::{Paragraph, Run, TextFrame, TextPiece, TextScope};
