use thiserror::Error;

/// Errors surfaced by the hashing engine.
#[derive(Debug, Error)]
pub enum HasherError {
    /// The requested piece length is not a power of two in the valid range.
    #[error("invalid piece length: {0} (expected a power of two between 16 KiB and 8 MiB)")]
    PieceLength(u64),

    /// The operation was stopped through its [`CancelToken`](crate::CancelToken).
    #[error("hashing cancelled")]
    Cancelled,

    /// Reading content from disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
