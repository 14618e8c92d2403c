/// Error types for template rendering.
use crate::convert::ConversionError;
use crate::ooxml::OoxmlError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The template file is missing or cannot be read
    #[error("Template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template is not a readable presentation package
    #[error("Corrupt template: {0}")]
    CorruptTemplate(#[from] OoxmlError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}
