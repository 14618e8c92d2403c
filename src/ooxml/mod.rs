//! Office Open XML (OOXML) support for presentation templates.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships)
//! 2. **PresentationML** (`pptx`): slides, notes, text frames and the
//!    in-place edits used by the renderer
//!
//! # Example
//!
//! ```rust,no_run
//! use deckrender::ooxml::pptx::Package;
//!
//! let pkg = Package::open("template.pptx")?;
//! let pres = pkg.presentation()?;
//! for slide in pres.slides()? {
//!     println!("{}: {:?}", slide.index(), slide.notes_text()?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
