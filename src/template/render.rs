//! Rendering a deck from the template.
//!
//! One render loads its own copy of the template, removes the slides whose
//! notes carry a tag that is switched off, substitutes placeholders in what
//! is left, optionally removes slides by number, and serializes the result.
//! The template itself is never written.

use crate::convert::Converter;
use crate::ooxml::pptx::Package;
use crate::template::error::{RenderError, Result};
use crate::template::replace::ReplacementMap;
use crate::template::selection::slide_indices_from_numbers;
use crate::template::tags::tags;
use crate::template::toggles::ToggleMap;
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where the template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Read from disk on every render
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl TemplateSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Whether the template can be found at all.
    pub fn exists(&self) -> bool {
        match self {
            Self::Path(path) => path.is_file(),
            Self::Bytes(_) => true,
        }
    }

    fn load(&self) -> Result<Package> {
        match self {
            Self::Path(path) => {
                let data = std::fs::read(path).map_err(|e| {
                    debug!(path = %path.display(), error = %e, "template unreadable");
                    RenderError::TemplateNotFound(path.clone())
                })?;
                Ok(Package::from_bytes(&data)?)
            },
            Self::Bytes(bytes) => Ok(Package::from_bytes(bytes)?),
        }
    }
}

impl From<&Path> for TemplateSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// What a render did, for logging and callers that want to know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Original indices of slides removed by tag
    pub removed_by_tag: Vec<usize>,
    /// Indices, in the tag-pruned deck, of slides removed by number
    pub removed_by_number: Vec<usize>,
    pub runs_changed: usize,
    pub slide_count: usize,
}

/// A rendered .pptx owned by the caller.
#[derive(Debug, Clone)]
pub struct RenderedDeck {
    bytes: Vec<u8>,
    report: RenderReport,
}

impl RenderedDeck {
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn report(&self) -> &RenderReport {
        &self.report
    }

    /// A reader positioned at the first byte of the deck.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }

    /// Convert the deck with `converter`, typically to PDF.
    pub fn convert<C: Converter + ?Sized>(&self, converter: &C) -> Result<Vec<u8>> {
        Ok(converter.convert(&self.bytes)?)
    }
}

/// Renders decks from one template.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    source: TemplateSource,
}

impl TemplateRenderer {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    #[inline]
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Prune by tag and substitute placeholders.
    pub fn render(&self, replacements: &ReplacementMap, toggles: &ToggleMap) -> Result<RenderedDeck> {
        self.render_with_removals(replacements, toggles, &[])
    }

    /// Like [`render`](Self::render), then also remove the given 1-based
    /// slide numbers of the rendered deck.
    pub fn render_with_removals(
        &self,
        replacements: &ReplacementMap,
        toggles: &ToggleMap,
        remove_numbers: &[i64],
    ) -> Result<RenderedDeck> {
        let mut pkg = self.source.load()?;

        let removed_by_tag = prune_by_tags(&mut pkg, toggles)?;
        let runs_changed = substitute(&mut pkg, replacements)?;
        let removed_by_number = match remove_numbers {
            [] => Vec::new(),
            numbers => pkg.remove_slides(slide_indices_from_numbers(numbers))?,
        };

        let slide_count = pkg.presentation()?.slide_count()?;
        let bytes = pkg.to_bytes()?;

        let report = RenderReport {
            removed_by_tag,
            removed_by_number,
            runs_changed,
            slide_count,
        };
        info!(
            slides = report.slide_count,
            removed_by_tag = report.removed_by_tag.len(),
            removed_by_number = report.removed_by_number.len(),
            runs_changed = report.runs_changed,
            bytes = bytes.len(),
            "rendered deck"
        );

        Ok(RenderedDeck { bytes, report })
    }
}

/// Remove every slide whose notes declare a tag that `toggles` switches off.
///
/// Returns the original indices of the removed slides.
pub fn prune_by_tags(pkg: &mut Package, toggles: &ToggleMap) -> Result<Vec<usize>> {
    let removed = pkg.remove_slides_where(|slide| {
        let notes = slide.notes_text()?.unwrap_or_default();
        let remove = toggles.should_remove(tags(&notes));
        if remove {
            debug!(index = slide.index(), notes = %notes, "slide toggled off");
        }
        Ok(remove)
    })?;
    Ok(removed)
}

/// Substitute every token of `replacements` in slide shapes and notes.
///
/// Returns the number of runs changed.
pub fn substitute(pkg: &mut Package, replacements: &ReplacementMap) -> Result<usize> {
    if replacements.is_empty() {
        return Ok(0);
    }
    Ok(pkg.rewrite_runs(|text| replacements.apply(text))?)
}
