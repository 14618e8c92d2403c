/// Presentation: the main API for working with PowerPoint presentations.
use crate::ooxml::error::Result;
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::parts::PresentationPart;
use crate::ooxml::pptx::slide::Slide;

/// The main presentation object of a package.
pub struct Presentation<'a> {
    part: PresentationPart<'a>,
    partname: PackURI,
    package: &'a OpcPackage,
}

impl<'a> Presentation<'a> {
    pub(crate) fn new(package: &'a OpcPackage) -> Result<Self> {
        let partname = package.main_document_partname()?;
        let part = PresentationPart::from_part(package.get_part(&partname)?);
        Ok(Self {
            part,
            partname,
            package,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    pub fn slide_count(&self) -> Result<usize> {
        self.part.slide_count()
    }

    /// All slides in presentation order.
    ///
    /// Every `p:sldId` must resolve to a slide part; a dangling reference is
    /// an error.
    pub fn slides(&self) -> Result<Vec<Slide<'a>>> {
        self.part
            .slide_id_list()?
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let partname = self.package.related_partname(&self.partname, &entry.r_id)?;
                self.package.get_part(&partname)?;
                Ok(Slide::new(index, entry, partname, self.package))
            })
            .collect()
    }

    /// The slide at zero-based `index`, if any.
    pub fn slide(&self, index: usize) -> Result<Option<Slide<'a>>> {
        Ok(self.slides()?.into_iter().nth(index))
    }
}
