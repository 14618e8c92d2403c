use std::io;
use std::time::Duration;
use thiserror::Error;

/// Error types for deck conversion.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter program could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The converter exited unsuccessfully
    #[error("Converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Conversion timed out after {0:?}")]
    TimedOut(Duration),

    /// The converter succeeded but wrote no output file
    #[error("Converter produced no output")]
    MissingOutput,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
