use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Traversal
    #[error("cannot stat {}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open directory {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read directory {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed directory record in {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    // Config
    #[error("invalid buffer size {0}")]
    InvalidBufferSize(usize),
}

impl Error {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Metadata { path, .. }
            | Self::Open { path, .. }
            | Self::Read { path, .. }
            | Self::Decode { path, .. } => Some(path),
            Self::InvalidBufferSize(_) => None,
        }
    }

    /// The underlying I/O error, if this error came from a system call.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Self::Metadata { source, .. }
            | Self::Open { source, .. }
            | Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A raw directory record that could not be decoded.
///
/// Offsets are relative to the start of the buffer handed to the decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record header at offset {offset} runs past end of buffer")]
    Truncated { offset: usize },

    #[error("record at offset {offset} declares length {reclen}")]
    BadRecordLength { offset: usize, reclen: usize },

    #[error("record at offset {offset} has no NUL terminator in its name slot")]
    MissingNul { offset: usize },

    #[error("record at offset {offset} has an empty name")]
    EmptyName { offset: usize },
}
