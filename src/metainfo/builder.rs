//! Metainfo builder: walks content on disk, drives the hash engine, and
//! assembles the document for any of the three wire variants.
//!
//! ```no_run
//! use torrentkit::metainfo::{ProtocolVersion, TorrentBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let torrent = TorrentBuilder::new("path/to/content")
//!     .version(ProtocolVersion::Hybrid)
//!     .tracker("http://tracker.example.com/announce")
//!     .comment("nightly build")
//!     .build()?;
//! let written = torrent.write()?; // path/to/content.torrent
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::error::MetainfoError;
use super::file_tree::FileTree;
use super::info_hash::InfoHash;
use super::torrent::{sha1_of, sha256_of, ProtocolVersion};
use crate::bencode::{encode, Value};
use crate::cancel::CancelToken;
use crate::hasher::{
    normalize_piece_length, piece_length_for, FileMerkle, HybridFileMerkle, PieceFeed,
};

/// Per-build progress callback, invoked with cumulative bytes hashed.
pub type ProgressFn = Box<dyn FnMut(u64)>;

/// One file discovered by the content walk.
struct WalkedFile {
    /// Path segments relative to the content root.
    rel: Vec<String>,
    abs: PathBuf,
    length: u64,
}

/// Builds `.torrent` documents from files on disk.
///
/// Configuration is fluent; [`build`](Self::build) performs the walk and the
/// hashing. Directory entries are visited in case-insensitive name order so
/// repeated builds of the same content are byte-identical (apart from the
/// creation date).
pub struct TorrentBuilder {
    path: PathBuf,
    version: ProtocolVersion,
    piece_length: Option<u64>,
    trackers: Vec<String>,
    private: bool,
    source: Option<String>,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<i64>,
    web_seeds: Vec<String>,
    http_seeds: Vec<String>,
    progress: Option<ProgressFn>,
    cancel: CancelToken,
}

impl TorrentBuilder {
    /// Starts a builder for the file or directory at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: ProtocolVersion::V1,
            piece_length: None,
            trackers: Vec::new(),
            private: false,
            source: None,
            comment: None,
            created_by: None,
            creation_date: None,
            web_seeds: Vec::new(),
            http_seeds: Vec::new(),
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    /// Selects the wire variant to produce. Defaults to v1.
    pub fn version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Requests a piece length: either a byte count (power of two between
    /// 16 KiB and 8 MiB) or the exponent shorthand `14..=23`. When unset, a
    /// length is chosen from the content size.
    pub fn piece_length(mut self, length: u64) -> Self {
        self.piece_length = Some(length);
        self
    }

    /// Adds a tracker URL. The first becomes `announce`; every URL gets its
    /// own `announce-list` tier.
    pub fn tracker(mut self, url: impl Into<String>) -> Self {
        self.trackers.push(url.into());
        self
    }

    /// Adds several tracker URLs at once.
    pub fn trackers<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trackers.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Marks the torrent private (BEP-27).
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Sets the private-tracker source tag. Changes the info hash.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the document comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Overrides the `created by` string.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Overrides the creation timestamp (Unix seconds).
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// Adds a web seed URL (`url-list`, BEP-19).
    pub fn web_seed(mut self, url: impl Into<String>) -> Self {
        self.web_seeds.push(url.into());
        self
    }

    /// Adds an HTTP seed URL (`httpseeds`, BEP-17).
    pub fn http_seed(mut self, url: impl Into<String>) -> Self {
        self.http_seeds.push(url.into());
        self
    }

    /// Registers a progress callback receiving cumulative bytes hashed.
    pub fn progress(mut self, callback: impl FnMut(u64) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Installs a cancellation token checked at block boundaries.
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walks the content, hashes it, and assembles the document.
    pub fn build(mut self) -> Result<Torrent, MetainfoError> {
        if !self.path.exists() {
            return Err(MetainfoError::MissingPath(self.path.clone()));
        }
        if self.trackers.is_empty() {
            return Err(MetainfoError::MissingTracker);
        }

        let files = walk(&self.path)?;
        let total: u64 = files.iter().map(|f| f.length).sum();
        let piece_length = match self.piece_length {
            Some(requested) => normalize_piece_length(requested)?,
            None => piece_length_for(total),
        };

        tracing::debug!(
            path = %self.path.display(),
            version = ?self.version,
            piece_length,
            total,
            files = files.len(),
            "building metainfo"
        );

        let mut progress = self.progress.take();
        let (info, piece_layers) = match self.version {
            ProtocolVersion::V1 => (
                self.info_v1(&files, total, piece_length, &mut progress)?,
                BTreeMap::new(),
            ),
            ProtocolVersion::V2 => self.info_v2(&files, total, piece_length, &mut progress)?,
            ProtocolVersion::Hybrid => {
                self.info_hybrid(&files, total, piece_length, &mut progress)?
            }
        };

        let raw_info = encode(&Value::Dict(info.clone()));
        let info_hash = match self.version {
            ProtocolVersion::V1 => InfoHash::V1(sha1_of(&raw_info)),
            ProtocolVersion::V2 => InfoHash::V2(sha256_of(&raw_info)),
            ProtocolVersion::Hybrid => InfoHash::Hybrid {
                v1: sha1_of(&raw_info),
                v2: sha256_of(&raw_info),
            },
        };

        let mut root = BTreeMap::new();
        root.insert(Bytes::from_static(b"info"), Value::Dict(info));
        if !piece_layers.is_empty() {
            root.insert(
                Bytes::from_static(b"piece layers"),
                Value::Dict(piece_layers),
            );
        }
        self.top_level_fields(&mut root);

        Ok(Torrent {
            document: Value::Dict(root),
            info_hash,
            content_path: self.path,
        })
    }

    fn info_v1(
        &self,
        files: &[WalkedFile],
        total: u64,
        piece_length: u64,
        progress: &mut Option<ProgressFn>,
    ) -> Result<BTreeMap<Bytes, Value>, MetainfoError> {
        let mut info = self.info_common(piece_length)?;

        let paths: Vec<PathBuf> = files.iter().map(|f| f.abs.clone()).collect();
        let mut pieces = Vec::with_capacity((total / piece_length + 1) as usize * 20);
        let mut hashed = 0u64;
        for digest in PieceFeed::new(paths, piece_length, self.cancel.clone()) {
            pieces.extend_from_slice(&digest?);
            hashed = (hashed + piece_length).min(total);
            if let Some(cb) = progress.as_mut() {
                cb(hashed);
            }
        }
        info.insert(Bytes::from_static(b"pieces"), Value::from(pieces));

        if self.path.is_file() {
            info.insert(Bytes::from_static(b"length"), Value::from(total));
        } else {
            let spans: Vec<Value> = files
                .iter()
                .map(|f| file_span_value(f.length, &f.rel))
                .collect();
            info.insert(Bytes::from_static(b"files"), Value::List(spans));
        }
        Ok(info)
    }

    fn info_v2(
        &self,
        files: &[WalkedFile],
        total: u64,
        piece_length: u64,
        progress: &mut Option<ProgressFn>,
    ) -> Result<(BTreeMap<Bytes, Value>, BTreeMap<Bytes, Value>), MetainfoError> {
        let mut tree = FileTree::empty_dir();
        let mut layers = BTreeMap::new();
        let mut hashed = 0u64;

        for file in files {
            let leaf = if file.length == 0 {
                FileTree::File {
                    length: 0,
                    pieces_root: None,
                }
            } else {
                let merkle = FileMerkle::from_path(&file.abs, piece_length, &self.cancel)?;
                if !merkle.piece_layer.is_empty() {
                    layers.insert(
                        Bytes::copy_from_slice(&merkle.root),
                        Value::from(concat_hashes(&merkle.piece_layer)),
                    );
                }
                FileTree::File {
                    length: file.length,
                    pieces_root: Some(merkle.root),
                }
            };
            tree.insert(&file.rel, leaf)?;
            hashed += file.length;
            if let Some(cb) = progress.as_mut() {
                cb(hashed);
            }
        }

        let mut info = self.info_common(piece_length)?;
        info.insert(Bytes::from_static(b"meta version"), Value::Integer(2));
        info.insert(Bytes::from_static(b"file tree"), tree.to_value());
        if self.path.is_file() {
            info.insert(Bytes::from_static(b"length"), Value::from(total));
        }
        Ok((info, layers))
    }

    fn info_hybrid(
        &self,
        files: &[WalkedFile],
        total: u64,
        piece_length: u64,
        progress: &mut Option<ProgressFn>,
    ) -> Result<(BTreeMap<Bytes, Value>, BTreeMap<Bytes, Value>), MetainfoError> {
        let mut tree = FileTree::empty_dir();
        let mut layers = BTreeMap::new();
        let mut pieces: Vec<u8> = Vec::new();
        let mut spans: Vec<Value> = Vec::new();
        let mut hashed = 0u64;

        for (index, file) in files.iter().enumerate() {
            let last = index + 1 == files.len();
            spans.push(file_span_value(file.length, &file.rel));

            if file.length == 0 {
                tree.insert(
                    &file.rel,
                    FileTree::File {
                        length: 0,
                        pieces_root: None,
                    },
                )?;
                continue;
            }

            let merkle =
                HybridFileMerkle::from_path(&file.abs, piece_length, !last, &self.cancel)?;
            for piece in &merkle.pieces {
                pieces.extend_from_slice(piece);
            }
            if !merkle.piece_layer.is_empty() {
                layers.insert(
                    Bytes::copy_from_slice(&merkle.root),
                    Value::from(concat_hashes(&merkle.piece_layer)),
                );
            }
            tree.insert(
                &file.rel,
                FileTree::File {
                    length: file.length,
                    pieces_root: Some(merkle.root),
                },
            )?;
            // Each file after this one starts on a piece boundary; declare
            // the zero fill that got hashed into the v1 stream.
            if !last && merkle.pad_length > 0 {
                spans.push(pad_span_value(merkle.pad_length));
            }

            hashed += file.length;
            if let Some(cb) = progress.as_mut() {
                cb(hashed);
            }
        }

        let mut info = self.info_common(piece_length)?;
        info.insert(Bytes::from_static(b"meta version"), Value::Integer(2));
        info.insert(Bytes::from_static(b"file tree"), tree.to_value());
        info.insert(Bytes::from_static(b"pieces"), Value::from(pieces));
        if self.path.is_file() {
            info.insert(Bytes::from_static(b"length"), Value::from(total));
        } else {
            info.insert(Bytes::from_static(b"files"), Value::List(spans));
        }
        Ok((info, layers))
    }

    fn info_common(&self, piece_length: u64) -> Result<BTreeMap<Bytes, Value>, MetainfoError> {
        let mut info = BTreeMap::new();
        info.insert(
            Bytes::from_static(b"name"),
            Value::from(file_name_of(&self.path)?),
        );
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::from(piece_length),
        );
        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }
        if let Some(source) = &self.source {
            info.insert(Bytes::from_static(b"source"), Value::from(source.clone()));
        }
        Ok(info)
    }

    fn top_level_fields(&self, root: &mut BTreeMap<Bytes, Value>) {
        if let Some(first) = self.trackers.first() {
            root.insert(Bytes::from_static(b"announce"), Value::from(first.clone()));
        }
        let tiers: Vec<Value> = self
            .trackers
            .iter()
            .map(|url| Value::List(vec![Value::from(url.clone())]))
            .collect();
        root.insert(Bytes::from_static(b"announce-list"), Value::List(tiers));

        if let Some(comment) = &self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::from(comment.clone()));
        }

        let created_by = self
            .created_by
            .clone()
            .unwrap_or_else(|| format!("torrentkit/{}", env!("CARGO_PKG_VERSION")));
        root.insert(Bytes::from_static(b"created by"), Value::from(created_by));

        let timestamp = self.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });
        root.insert(
            Bytes::from_static(b"creation date"),
            Value::Integer(timestamp),
        );

        if !self.web_seeds.is_empty() {
            let urls: Vec<Value> = self
                .web_seeds
                .iter()
                .map(|u| Value::from(u.clone()))
                .collect();
            root.insert(Bytes::from_static(b"url-list"), Value::List(urls));
        }
        if !self.http_seeds.is_empty() {
            let urls: Vec<Value> = self
                .http_seeds
                .iter()
                .map(|u| Value::from(u.clone()))
                .collect();
            root.insert(Bytes::from_static(b"httpseeds"), Value::List(urls));
        }
    }
}

/// A built metainfo document, ready to encode or persist.
pub struct Torrent {
    document: Value,
    /// Identifying hash of the assembled info section.
    pub info_hash: InfoHash,
    content_path: PathBuf,
}

impl Torrent {
    /// The assembled document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Canonical encoded bytes of the document.
    pub fn encode(&self) -> Vec<u8> {
        encode(&self.document)
    }

    /// Writes the document next to the content as `<content>.torrent` and
    /// returns the written path.
    pub fn write(&self) -> Result<PathBuf, MetainfoError> {
        let mut name = self.content_path.as_os_str().to_os_string();
        name.push(".torrent");
        let out = PathBuf::from(name);
        self.write_to(&out)?;
        Ok(out)
    }

    /// Writes the document to the given path.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), MetainfoError> {
        std::fs::write(path, self.encode())?;
        Ok(())
    }
}

/// Collects the content files: a single file, or a recursive directory walk
/// with entries in case-insensitive name order at every level.
fn walk(root: &Path) -> Result<Vec<WalkedFile>, MetainfoError> {
    let mut files = Vec::new();
    if root.is_file() {
        files.push(WalkedFile {
            rel: vec![file_name_of(root)?],
            abs: root.to_path_buf(),
            length: root.metadata()?.len(),
        });
        return Ok(files);
    }
    walk_dir(root, &mut Vec::new(), &mut files)?;
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    rel: &mut Vec<String>,
    out: &mut Vec<WalkedFile>,
) -> Result<(), MetainfoError> {
    let mut entries: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| MetainfoError::InvalidField("file name"))?;
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    for (name, path) in entries {
        if path.is_dir() {
            rel.push(name);
            walk_dir(&path, rel, out)?;
            rel.pop();
        } else if path.is_file() {
            let length = path.metadata()?.len();
            let mut segments = rel.clone();
            segments.push(name);
            out.push(WalkedFile {
                rel: segments,
                abs: path,
                length,
            });
        }
    }
    Ok(())
}

fn file_name_of(path: &Path) -> Result<String, MetainfoError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or(MetainfoError::InvalidField("file name"))
}

fn file_span_value(length: u64, segments: &[String]) -> Value {
    let mut span = BTreeMap::new();
    span.insert(Bytes::from_static(b"length"), Value::from(length));
    let path: Vec<Value> = segments
        .iter()
        .map(|seg| Value::from(seg.clone()))
        .collect();
    span.insert(Bytes::from_static(b"path"), Value::List(path));
    Value::Dict(span)
}

fn pad_span_value(length: u64) -> Value {
    let mut span = BTreeMap::new();
    span.insert(Bytes::from_static(b"attr"), Value::string("p"));
    span.insert(Bytes::from_static(b"length"), Value::from(length));
    span.insert(
        Bytes::from_static(b"path"),
        Value::List(vec![Value::string(".pad"), Value::from(length.to_string())]),
    );
    Value::Dict(span)
}

fn concat_hashes(hashes: &[[u8; 32]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(hashes.len() * 32);
    for hash in hashes {
        out.extend_from_slice(hash);
    }
    out
}
