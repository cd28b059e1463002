use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("No MIDI sources were supplied..!")]
    EmptyInput,

    #[error("Failed to parse MIDI input #{input}: {reason}")]
    Parse { input: usize, reason: String },

    /// Never returned from parsing; reported through the log when an element is skipped.
    #[error("Unsupported {element} in track {track} at tick {tick}")]
    UnsupportedElement {
        track: usize,
        tick: u64,
        element: &'static str,
    },

    #[error("Invalid event record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Failed to read MIDI file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::EmptyInput => "empty_input",
            DigestError::Parse { .. } => "parse",
            DigestError::UnsupportedElement { .. } => "unsupported_element",
            DigestError::InvalidRecord { .. } => "invalid_record",
            DigestError::Io { .. } => "io",
        }
    }

    pub(crate) fn at_input(self, index: usize) -> Self {
        match self {
            DigestError::Parse { reason, .. } => DigestError::Parse {
                input: index,
                reason,
            },
            other => other,
        }
    }
}
