use std::path::PathBuf;
use thiserror::Error;

use crate::bencode::BencodeError;
use crate::hasher::HasherError;

/// Errors from parsing, building, or editing metainfo documents.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The document is not valid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or an invalid value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The content path handed to the builder does not exist.
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// No tracker URL was supplied at build time.
    #[error("no announce url supplied")]
    MissingTracker,

    /// Hashing the content failed (bad piece length, cancelled, or I/O).
    #[error(transparent)]
    Hasher(#[from] HasherError),

    /// Reading or writing the document failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
