use std::path::{Path, PathBuf};

/// Outcome of one verified piece.
#[derive(Debug, Clone)]
pub struct PieceOutcome {
    /// Whether the on-disk data reproduced the stored hash.
    pub matched: bool,
    /// Bytes this piece covered (the final piece may be short).
    pub length: u64,
    /// File the piece ended in.
    pub path: PathBuf,
}

/// Aggregate result of a verification run.
#[derive(Debug, Default)]
pub struct Report {
    /// Bytes covered by pieces whose hashes matched.
    pub matched_bytes: u64,
    /// Total bytes the check consumed (declared content size).
    pub consumed_bytes: u64,
    /// Per-piece outcomes in check order.
    pub pieces: Vec<PieceOutcome>,
}

impl Report {
    pub(crate) fn record(&mut self, matched: bool, length: u64, path: &Path) {
        self.consumed_bytes += length;
        if matched {
            self.matched_bytes += length;
        }
        self.pieces.push(PieceOutcome {
            matched,
            length,
            path: path.to_path_buf(),
        });
    }

    /// Match percentage, integer-truncated.
    ///
    /// Reaches 100 exactly when every expected piece matched. A torrent
    /// whose declared content is entirely empty files has nothing to
    /// mismatch and reports 100.
    pub fn percent(&self) -> u8 {
        if self.consumed_bytes == 0 {
            return 100;
        }
        (self.matched_bytes * 100 / self.consumed_bytes) as u8
    }

    /// True when every piece matched.
    pub fn is_complete(&self) -> bool {
        self.matched_bytes == self.consumed_bytes
    }
}
