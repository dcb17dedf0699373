use std::path::PathBuf;
use thiserror::Error;

use crate::metainfo::MetainfoError;

/// Fatal verification failures.
///
/// Missing, truncated, or mismatched content is never an error - it degrades
/// the reported percentage instead. Only an unreadable metainfo document or
/// an unlocatable content root stops a check.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The metainfo document could not be read or decoded.
    #[error("metainfo error: {0}")]
    Metainfo(#[from] MetainfoError),

    /// The torrent's declared root was not found at or under the supplied
    /// path.
    #[error("torrent content not found under {}", .0.display())]
    ContentNotFound(PathBuf),

    /// The check was stopped through its [`CancelToken`](crate::CancelToken).
    #[error("verification cancelled")]
    Cancelled,

    /// Reading the content root failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
