//! Open Packaging Conventions (OPC) implementation.
//!
//! The subset of the OPC specification a presentation renderer needs:
//!
//! - Package structure (parts, relationships)
//! - Content type discovery and regeneration
//! - ZIP-based physical packaging
//!
//! Part content is kept as raw bytes; XML is scanned with `quick-xml` and
//! edited by splicing byte ranges; `memchr` counts `r:id` references.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
