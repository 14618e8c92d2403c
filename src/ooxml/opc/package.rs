//! In-memory OPC package.
//!
//! Holds the package relationships and every part reachable from them,
//! keyed by part name. Parts are edited in place and the whole package is
//! serialized again with [`PackageWriter`].

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub struct OpcPackage {
    /// Package-level relationships (`/_rels/.rels`)
    rels: Relationships,

    /// All loaded parts, indexed by partname
    parts: HashMap<PackURI, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Open an OPC package from a file.
    ///
    /// A missing file is reported as [`OpcError::PackageNotFound`] so callers
    /// can tell it apart from a file that exists but does not parse.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OpcError::PackageNotFound(path.display().to_string()),
            _ => OpcError::IoError(e),
        })?;
        Self::from_bytes(&data)
    }

    /// Load an OPC package from the bytes of a ZIP archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_bytes(data)?;
        let pkg_reader = PackageReader::from_phys_reader(phys_reader)?;
        Self::unmarshal(pkg_reader)
    }

    /// Build the object graph from serialized parts and relationships.
    fn unmarshal(mut pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();

        for srel in pkg_reader.pkg_srels() {
            package.rels.add_relationship(
                srel.reltype.clone(),
                srel.target_ref.clone(),
                srel.r_id.clone(),
                srel.is_external(),
            );
        }

        for spart in pkg_reader.take_sparts() {
            let mut part = PartFactory::load(spart.partname.clone(), spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut()
                    .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
            }
            package.parts.insert(spart.partname, part);
        }

        Ok(package)
    }

    /// Serialize the package to the bytes of a ZIP archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// The part targeted by the package's `officeDocument` relationship.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let partname = self.main_document_partname()?;
        self.get_part(&partname)
    }

    pub fn main_document_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname)
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname)
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Resolve relationship `r_id` of `source` to the target part name.
    pub fn related_partname(&self, source: &PackURI, r_id: &str) -> Result<PackURI> {
        self.get_part(source)?
            .rels()
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("{} in {}", r_id, source)))?
            .target_partname()
    }

    /// Target of the single relationship of `reltype` from `source`, if any.
    pub fn related_partname_by_type(
        &self,
        source: &PackURI,
        reltype: &str,
    ) -> Result<Option<PackURI>> {
        let part = self.get_part(source)?;
        match part.rels().part_with_reltype(reltype) {
            Ok(rel) => rel.target_partname().map(Some),
            Err(OpcError::RelationshipNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Iterate over all loaded parts, including ones no longer referenced.
    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    /// Part names reachable from the package relationships, sorted.
    ///
    /// Parts whose last incoming relationship was dropped are not included.
    pub fn reachable_partnames(&self) -> BTreeSet<PackURI> {
        let mut reachable = BTreeSet::new();
        let mut stack: Vec<PackURI> = internal_targets(&self.rels).collect();

        while let Some(partname) = stack.pop() {
            let Some(part) = self.parts.get(&partname) else {
                continue;
            };
            if reachable.insert(partname) {
                stack.extend(internal_targets(part.rels()));
            }
        }

        reachable
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

fn internal_targets(rels: &Relationships) -> impl Iterator<Item = PackURI> + '_ {
    rels.iter()
        .filter(|rel| !rel.is_external())
        .filter_map(|rel| rel.target_partname().ok())
}
