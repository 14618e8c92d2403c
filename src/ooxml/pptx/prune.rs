//! Slide removal.
//!
//! The slide list is read once, the indices to drop are fixed up front, and
//! entries are then removed from the highest index down. Removing an entry
//! drops the presentation part's relationship to the slide, so the slide,
//! its notes and anything only they reference are left out when the package
//! is written again.

use crate::ooxml::error::Result;
use crate::ooxml::pptx::package::Package;
use crate::ooxml::pptx::parts::presentation::parse_slide_id_list;
use crate::ooxml::pptx::slide::Slide;
use crate::ooxml::pptx::text::splice;
use std::collections::BTreeSet;
use tracing::debug;

impl Package {
    /// Remove the slides at the given zero-based indices.
    ///
    /// Indices refer to the slide order before the call. Duplicates and
    /// indices past the last slide are ignored. Returns the removed indices
    /// in ascending order.
    pub fn remove_slides<I>(&mut self, indices: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = usize>,
    {
        let partname = self.opc.main_document_partname()?;
        let part = self.opc.get_part_mut(&partname)?;
        let snapshot = parse_slide_id_list(part.blob())?;

        let selected: BTreeSet<usize> = indices
            .into_iter()
            .filter(|&index| index < snapshot.entries.len())
            .collect();
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let mut removed_ids = Vec::with_capacity(selected.len());
        for &index in selected.iter().rev() {
            let entry = &snapshot.entries[index];
            // The rel is only dropped while this entry is its last reference
            let rel_dropped = part.drop_rel(&entry.r_id);
            // Entries after this one are already gone, so the span is still valid
            let blob = splice(part.blob(), vec![(entry.span.clone(), Vec::new())]);
            part.set_blob(blob);
            debug!(index, r_id = %entry.r_id, rel_dropped, "removed slide");

            if let Some(id) = entry.id {
                removed_ids.push(id);
            }
        }

        let remaining = parse_slide_id_list(part.blob())?;
        let section_edits: Vec<_> = remaining
            .section_refs
            .iter()
            .filter(|r| removed_ids.contains(&r.id))
            .map(|r| (r.span.clone(), Vec::new()))
            .collect();
        if !section_edits.is_empty() {
            debug!(count = section_edits.len(), "removed section references");
            let blob = splice(part.blob(), section_edits);
            part.set_blob(blob);
        }

        Ok(selected.into_iter().collect())
    }

    /// Remove every slide for which `should_remove` returns `true`.
    ///
    /// The predicate sees each slide once, in order, before anything is
    /// removed.
    pub fn remove_slides_where<F>(&mut self, mut should_remove: F) -> Result<Vec<usize>>
    where
        F: FnMut(&Slide<'_>) -> Result<bool>,
    {
        let mut selected = Vec::new();
        for slide in self.presentation()?.slides()? {
            if should_remove(&slide)? {
                selected.push(slide.index());
            }
        }
        self.remove_slides(selected)
    }
}
