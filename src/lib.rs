//! deckrender - proposal decks from a single PowerPoint template
//!
//! Turns one `.pptx` template into company-specific decks:
//!
//! - **Placeholder substitution**: `{{TOKEN}}` text in slide shapes and notes
//!   is replaced run by run, leaving formatting and every other byte alone
//! - **Tag pruning**: slides whose notes carry `[[tag:NAME]]` are dropped when
//!   that tag is switched off
//! - **Slide removal**: drop slides by number from the rendered deck
//! - **PDF conversion**: through a headless LibreOffice
//!
//! The `server` feature (on by default) adds the HTTP service and its
//! configuration and logging.
//!
//! # Example
//!
//! ```no_run
//! use deckrender::template::{ReplacementMap, TemplateRenderer, TemplateSource, ToggleMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let renderer = TemplateRenderer::new(TemplateSource::path("template.pptx"));
//!
//! let mut replacements = ReplacementMap::new();
//! replacements.insert_placeholder("COMPANY_NAME", "Acme");
//! let mut toggles = ToggleMap::new();
//! toggles.set("pricing", false);
//!
//! let deck = renderer.render(&replacements, &toggles)?;
//! std::fs::write("acme.pptx", deck.bytes())?;
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod ooxml;
pub mod proposal;
pub mod template;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod logging;
#[cfg(feature = "server")]
pub mod server;

pub use convert::{ConversionError, Converter, LibreOfficeConverter};
pub use proposal::RenderRequest;
pub use template::{RenderError, RenderedDeck, ReplacementMap, TemplateRenderer, TemplateSource, ToggleMap};
