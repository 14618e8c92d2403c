/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::presentation::Presentation;
use crate::ooxml::pptx::text::{self, TextScope};
use std::collections::HashSet;
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// This is the main entry point for working with presentations. It wraps an
/// OPC package, checks that the main part really is a presentation, and
/// offers the edits the renderer needs: run rewriting here and slide
/// removal in `prune`.
///
/// # Examples
///
/// ```rust,no_run
/// use deckrender::ooxml::pptx::Package;
///
/// let pkg = Package::open("template.pptx")?;
/// let pres = pkg.presentation()?;
/// println!("Presentation has {} slides", pres.slide_count()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    pub(crate) opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Load a .pptx package from the bytes of the archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        // Regular and macro-enabled presentations share the same structure
        let content_type = main_part.content_type();
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(OoxmlError::InvalidContentType {
                expected: format!(
                    "{} or {}",
                    ct::PML_PRESENTATION_MAIN,
                    ct::PML_PRES_MACRO_MAIN
                ),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    /// Serialize the package to .pptx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Get the main presentation.
    pub fn presentation(&self) -> Result<Presentation<'_>> {
        Presentation::new(&self.opc)
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }

    /// Rewrite run text across every slide's shapes and notes body.
    ///
    /// `edit` is called with the text of each non-empty run and returns the
    /// new text, or `None` to keep it. Returns the number of runs changed.
    pub fn rewrite_runs<F>(&mut self, mut edit: F) -> Result<usize>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let targets = self.text_targets()?;

        let mut runs_changed = 0;
        for (partname, scope) in targets {
            let part = self.opc.get_part_mut(&partname)?;
            if let Some(edits) = text::rewrite_runs(part.blob(), scope, &mut edit)? {
                runs_changed += edits.runs_changed;
                part.set_blob(edits.xml);
            }
        }
        Ok(runs_changed)
    }

    /// Slide and notes parts to visit, each once, in slide order.
    fn text_targets(&self) -> Result<Vec<(PackURI, TextScope)>> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for slide in self.presentation()?.slides()? {
            if seen.insert(slide.partname().clone()) {
                targets.push((slide.partname().clone(), TextScope::SlideShapes));
            }
            if let Some(notes) = slide.notes_partname()?
                && seen.insert(notes.clone())
            {
                targets.push((notes, TextScope::NotesBody));
            }
        }
        Ok(targets)
    }
}
