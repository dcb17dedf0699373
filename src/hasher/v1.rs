use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use sha1::{Digest, Sha1};

use super::error::HasherError;
use crate::cancel::CancelToken;

/// Lazy v1 piece hasher.
///
/// Treats an ordered list of files as one contiguous byte stream, splits it
/// into piece-length chunks (the final chunk may be short), and yields the
/// SHA1 digest of each chunk. The stream is single-pass: files are opened as
/// they are reached and closed as they are exhausted, and iterating again
/// requires building a new feed. Memory use stays at one piece buffer.
pub struct PieceFeed {
    paths: std::vec::IntoIter<PathBuf>,
    current: Option<File>,
    buf: Vec<u8>,
    cancel: CancelToken,
    finished: bool,
}

impl PieceFeed {
    /// Creates a feed over `paths` in the given order.
    pub fn new(paths: Vec<PathBuf>, piece_length: u64, cancel: CancelToken) -> Self {
        Self {
            paths: paths.into_iter(),
            current: None,
            buf: vec![0u8; piece_length as usize],
            cancel,
            finished: false,
        }
    }

    /// Fills the piece buffer across file boundaries, returning how many
    /// bytes were gathered. Zero means the stream is exhausted.
    fn fill_piece(&mut self) -> Result<usize, HasherError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            if self.cancel.is_cancelled() {
                return Err(HasherError::Cancelled);
            }
            if self.current.is_none() {
                match self.paths.next() {
                    Some(path) => {
                        tracing::trace!(path = %path.display(), "v1 stream: next file");
                        self.current = Some(File::open(&path)?);
                    }
                    None => break,
                }
            }
            let Some(file) = self.current.as_mut() else {
                continue;
            };
            let n = file.read(&mut self.buf[filled..])?;
            if n == 0 {
                self.current = None;
                continue;
            }
            filled += n;
        }
        Ok(filled)
    }
}

impl Iterator for PieceFeed {
    type Item = Result<[u8; 20], HasherError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.fill_piece() {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(filled) => {
                if filled < self.buf.len() {
                    self.finished = true;
                }
                let mut hasher = Sha1::new();
                hasher.update(&self.buf[..filled]);
                Some(Ok(hasher.finalize().into()))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
