//! Conversion of rendered decks to fixed-layout documents.
//!
//! The renderer only knows the [`Converter`] capability. The production
//! implementation shells out to LibreOffice.

mod error;
mod libreoffice;

pub use error::ConversionError;
pub use libreoffice::{DEFAULT_TIMEOUT, LibreOfficeConverter};

/// Turns .pptx bytes into document bytes (PDF for [`LibreOfficeConverter`]).
pub trait Converter: Send + Sync {
    fn convert(&self, deck: &[u8]) -> Result<Vec<u8>, ConversionError>;
}
