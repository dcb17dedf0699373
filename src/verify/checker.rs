use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use super::error::VerifyError;
use super::report::Report;
use crate::cancel::CancelToken;
use crate::hasher::{FileMerkle, HasherError};
use crate::metainfo::{Metainfo, ProtocolVersion};

/// Per-piece progress callback: match outcome, the file the piece ended in,
/// and the expected digest from the document.
pub type ProgressFn = Box<dyn FnMut(bool, &Path, &[u8])>;

/// One file the document expects on disk.
struct Expected {
    path: PathBuf,
    length: u64,
    /// v2 merkle root; `None` for v1 entries and empty files.
    root: Option<[u8; 32]>,
    /// Padding entries are zeros by definition and never looked up on disk.
    synthetic: bool,
}

/// Streaming content verifier.
///
/// Construction performs the load and root-location steps; [`check`]
/// (Self::check) enumerates the expected files and re-derives their hashes
/// from disk with the same engine the builder used. Content problems
/// degrade the resulting [`Report`]; only an unreadable document or a
/// missing root fail.
pub struct Checker {
    meta: Metainfo,
    root: PathBuf,
    progress: Option<ProgressFn>,
    cancel: CancelToken,
}

impl Checker {
    /// Loads the document at `metafile` and locates the content root under
    /// `content`.
    pub fn new(
        metafile: impl AsRef<Path>,
        content: impl AsRef<Path>,
    ) -> Result<Self, VerifyError> {
        let meta = Metainfo::load(metafile.as_ref())?;
        Self::with_metainfo(meta, content)
    }

    /// Uses an already-parsed document.
    pub fn with_metainfo(
        meta: Metainfo,
        content: impl AsRef<Path>,
    ) -> Result<Self, VerifyError> {
        let root = locate_root(&meta.info.name, content.as_ref())?;
        tracing::debug!(
            name = %meta.info.name,
            root = %root.display(),
            version = ?meta.version,
            "content root located"
        );
        Ok(Self {
            meta,
            root,
            progress: None,
            cancel: CancelToken::new(),
        })
    }

    /// Registers a per-piece progress callback.
    pub fn with_progress(mut self, callback: impl FnMut(bool, &Path, &[u8]) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Installs a cancellation token checked at piece boundaries.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs the comparison and produces the report.
    pub fn check(mut self) -> Result<Report, VerifyError> {
        let mut progress = self.progress.take();
        match self.meta.version {
            ProtocolVersion::V1 => self.check_v1(&mut progress),
            ProtocolVersion::V2 | ProtocolVersion::Hybrid => self.check_v2(&mut progress),
        }
    }

    /// v1: stream every expected file through piece-length buffers in
    /// declared order, SHA1 each piece, and compare against the stored
    /// digest at the same index. Absent or truncated files contribute
    /// zero-filled bytes for their declared length.
    fn check_v1(&self, progress: &mut Option<ProgressFn>) -> Result<Report, VerifyError> {
        let expected = self.expected_v1();
        let piece_length = self.meta.info.piece_length as usize;
        let pieces = self.meta.info.pieces.clone();
        tracing::debug!(pieces = pieces.len() / 20, "starting v1 verification");

        let mut report = Report::default();
        let mut buf = vec![0u8; piece_length];
        let mut filled = 0usize;
        let mut index = 0usize;
        let mut current = self.root.clone();

        for entry in &expected {
            if entry.length == 0 {
                continue;
            }
            current.clone_from(&entry.path);

            let mut source = if entry.synthetic {
                None
            } else {
                match File::open(&entry.path) {
                    Ok(file) => Some(file),
                    Err(_) => {
                        tracing::warn!(
                            path = %entry.path.display(),
                            "expected file unreadable; scoring as zeros"
                        );
                        None
                    }
                }
            };

            let mut remaining = entry.length;
            while remaining > 0 {
                if self.cancel.is_cancelled() {
                    return Err(VerifyError::Cancelled);
                }
                let want = (piece_length - filled).min(remaining as usize);
                let slice = &mut buf[filled..filled + want];
                let got = match source.as_mut() {
                    Some(file) => read_up_to(file, slice)?,
                    None => 0,
                };
                if got < want {
                    // Truncated or absent: the remainder of this file's
                    // declared length reads as zeros.
                    slice[got..].fill(0);
                    source = None;
                }
                filled += want;
                remaining -= want as u64;

                if filled == piece_length {
                    record_v1_piece(&mut report, progress, &pieces, index, &buf, &current);
                    index += 1;
                    filled = 0;
                }
            }
        }
        if filled > 0 {
            record_v1_piece(&mut report, progress, &pieces, index, &buf[..filled], &current);
        }

        tracing::debug!(percent = report.percent(), "v1 verification finished");
        Ok(report)
    }

    /// v2/hybrid: hash each present file with the builder's block/merkle
    /// scheme and compare layer-by-layer, or root-to-root for files within
    /// one piece. Absent files score every expected piece as a mismatch.
    fn check_v2(&self, progress: &mut Option<ProgressFn>) -> Result<Report, VerifyError> {
        let expected = self.expected_v2()?;
        let piece_length = self.meta.info.piece_length;
        tracing::debug!(files = expected.len(), "starting v2 verification");

        let mut report = Report::default();
        for entry in &expected {
            if self.cancel.is_cancelled() {
                return Err(VerifyError::Cancelled);
            }
            // Zero-length files carry no hash data and are satisfied by
            // their mere declaration.
            if entry.length == 0 {
                continue;
            }
            let Some(root_hash) = entry.root else {
                record_piece(&mut report, progress, false, entry.length, &entry.path, &[]);
                continue;
            };

            let derived = if entry.path.is_file() {
                match FileMerkle::from_path(&entry.path, piece_length, &self.cancel) {
                    Ok(merkle) => Some(merkle),
                    Err(HasherError::Cancelled) => return Err(VerifyError::Cancelled),
                    Err(err) => {
                        tracing::warn!(
                            path = %entry.path.display(),
                            error = %err,
                            "hashing failed; scoring file as absent"
                        );
                        None
                    }
                }
            } else {
                None
            };

            match self.meta.piece_layers.get(root_hash.as_slice()) {
                Some(stored) => {
                    let mut remaining = entry.length;
                    for (i, piece) in stored.chunks(32).enumerate() {
                        let size = remaining.min(piece_length);
                        remaining -= size;
                        let matched = derived
                            .as_ref()
                            .and_then(|m| m.piece_layer.get(i))
                            .is_some_and(|layer| layer.as_slice() == piece);
                        record_piece(&mut report, progress, matched, size, &entry.path, piece);
                    }
                }
                None => {
                    // No layer entry: the file fits in one piece and its
                    // root is the only stored hash.
                    let matched = derived.is_some_and(|m| m.root == root_hash);
                    record_piece(
                        &mut report,
                        progress,
                        matched,
                        entry.length,
                        &entry.path,
                        &root_hash,
                    );
                }
            }
        }

        tracing::debug!(percent = report.percent(), "v2 verification finished");
        Ok(report)
    }

    fn expected_v1(&self) -> Vec<Expected> {
        if let Some(length) = self.meta.info.length {
            return vec![Expected {
                path: self.root.clone(),
                length,
                root: None,
                synthetic: false,
            }];
        }
        self.meta
            .info
            .files
            .iter()
            .map(|span| {
                let mut path = self.root.clone();
                for segment in &span.path {
                    path.push(segment);
                }
                Expected {
                    path,
                    length: span.length,
                    root: None,
                    synthetic: span.is_padding(),
                }
            })
            .collect()
    }

    fn expected_v2(&self) -> Result<Vec<Expected>, VerifyError> {
        let tree = self
            .meta
            .info
            .file_tree
            .as_ref()
            .ok_or(VerifyError::Metainfo(
                crate::metainfo::MetainfoError::MissingField("file tree"),
            ))?;
        let flat = tree.flatten();

        // A single-file torrent's located root is the file itself; the
        // tree's lone entry repeats the name.
        if self.root.is_file() {
            return Ok(flat
                .into_iter()
                .take(1)
                .map(|file| Expected {
                    path: self.root.clone(),
                    length: file.length,
                    root: file.pieces_root,
                    synthetic: false,
                })
                .collect());
        }

        Ok(flat
            .into_iter()
            .map(|file| Expected {
                path: self.root.join(&file.path),
                length: file.length,
                root: file.pieces_root,
                synthetic: false,
            })
            .collect())
    }
}

/// Resolves the supplied path to the torrent's declared root: the path
/// itself when its base name matches, otherwise a matching immediate child.
fn locate_root(name: &str, supplied: &Path) -> Result<PathBuf, VerifyError> {
    if !supplied.exists() {
        return Err(VerifyError::ContentNotFound(supplied.to_path_buf()));
    }
    if supplied.file_name().and_then(|n| n.to_str()) == Some(name) {
        return Ok(supplied.to_path_buf());
    }
    if supplied.is_dir() {
        for entry in std::fs::read_dir(supplied)? {
            let entry = entry?;
            if entry.file_name().to_str() == Some(name) {
                return Ok(entry.path());
            }
        }
    }
    Err(VerifyError::ContentNotFound(supplied.to_path_buf()))
}

fn record_v1_piece(
    report: &mut Report,
    progress: &mut Option<ProgressFn>,
    pieces: &[u8],
    index: usize,
    data: &[u8],
    path: &Path,
) {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let digest: [u8; 20] = hasher.finalize().into();

    let expected = pieces.get(index * 20..index * 20 + 20).unwrap_or(&[]);
    let matched = expected == digest.as_slice();
    record_piece(report, progress, matched, data.len() as u64, path, expected);
}

fn record_piece(
    report: &mut Report,
    progress: &mut Option<ProgressFn>,
    matched: bool,
    length: u64,
    path: &Path,
    expected: &[u8],
) {
    report.record(matched, length, path);
    if let Some(callback) = progress.as_mut() {
        callback(matched, path, expected);
    }
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
