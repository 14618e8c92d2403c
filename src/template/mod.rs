//! Proposal rendering on top of the presentation layer.
//!
//! - [`tags`]: `[[tag:NAME]]` annotations in slide notes
//! - [`ReplacementMap`]: `{{TOKEN}}` substitution values
//! - [`ToggleMap`]: which tags are switched on
//! - [`TemplateRenderer`]: prune, substitute, serialize

pub mod error;
pub mod render;
pub mod replace;
pub mod selection;
pub mod tags;
pub mod toggles;

pub use error::{RenderError, Result};
pub use render::{RenderReport, RenderedDeck, TemplateRenderer, TemplateSource, prune_by_tags, substitute};
pub use replace::ReplacementMap;
pub use selection::slide_indices_from_numbers;
pub use tags::extract_tags;
pub use toggles::ToggleMap;
