use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use super::error::MetainfoError;
use super::file_tree::FileTree;
use super::info_hash::InfoHash;
use crate::bencode::{decode, encode, Value};

/// The wire variant a metainfo document targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// BEP-3: flat SHA1 piece hashes.
    V1,
    /// BEP-52: per-file SHA256 merkle trees.
    V2,
    /// Both at once, for backward compatibility.
    Hybrid,
}

impl ProtocolVersion {
    /// True when v1 clients can use this document.
    pub fn supports_v1(&self) -> bool {
        matches!(self, ProtocolVersion::V1 | ProtocolVersion::Hybrid)
    }

    /// True when v2 clients can use this document.
    pub fn supports_v2(&self) -> bool {
        matches!(self, ProtocolVersion::V2 | ProtocolVersion::Hybrid)
    }
}

/// One entry of a v1 `files` list: ordered path segments plus length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpan {
    /// Path segments relative to the torrent root directory.
    pub path: Vec<String>,
    /// Declared length in bytes.
    pub length: u64,
    /// BEP-47 attributes, e.g. `p` for padding files.
    pub attr: Option<String>,
}

impl FileSpan {
    /// True for synthetic padding entries that align hybrid files to piece
    /// boundaries. Padding carries no real content.
    pub fn is_padding(&self) -> bool {
        self.attr.as_deref().is_some_and(|a| a.contains('p'))
            || self.path.first().is_some_and(|seg| seg == ".pad")
    }
}

/// The info section of a metainfo document.
#[derive(Debug, Clone)]
pub struct Info {
    /// Suggested name of the file (single) or root directory (multi).
    pub name: String,
    /// Piece size in bytes.
    pub piece_length: u64,
    /// Restricts peers to the listed trackers when set.
    pub private: bool,
    /// Private-tracker source tag. Part of the info hash by design.
    pub source: Option<String>,
    /// `meta version` key; `Some(2)` for v2 and hybrid documents.
    pub meta_version: Option<i64>,
    /// Concatenated 20-byte SHA1 piece digests (v1/hybrid), else empty.
    pub pieces: Bytes,
    /// Single-file length, when the document describes one file.
    pub length: Option<u64>,
    /// v1 multi-file list, padding entries included.
    pub files: Vec<FileSpan>,
    /// v2 file tree, when present.
    pub file_tree: Option<FileTree>,
}

impl Info {
    /// Number of v1 pieces described by this document.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / 20
    }

    /// Total declared content size, excluding padding entries.
    pub fn total_length(&self) -> u64 {
        if let Some(tree) = &self.file_tree {
            return tree.flatten().iter().map(|f| f.length).sum();
        }
        if let Some(length) = self.length {
            return length;
        }
        self.files
            .iter()
            .filter(|f| !f.is_padding())
            .map(|f| f.length)
            .sum()
    }
}

/// A parsed metainfo document.
#[derive(Debug, Clone)]
pub struct Metainfo {
    /// The info section.
    pub info: Info,
    /// Identifying hash of the canonically encoded info section.
    pub info_hash: InfoHash,
    /// Primary tracker URL.
    pub announce: Option<String>,
    /// Tracker tiers (BEP-12 `announce-list`).
    pub announce_list: Vec<Vec<String>>,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Creating program.
    pub created_by: Option<String>,
    /// Unix timestamp of creation.
    pub creation_date: Option<i64>,
    /// Web seed URLs (`url-list`, BEP-19).
    pub web_seeds: Vec<String>,
    /// HTTP seed URLs (`httpseeds`, BEP-17).
    pub http_seeds: Vec<String>,
    /// v2 piece layers: merkle root -> concatenated layer hashes.
    pub piece_layers: BTreeMap<Bytes, Bytes>,
    /// Detected wire variant.
    pub version: ProtocolVersion,
    raw_info: Bytes,
}

impl Metainfo {
    /// Parses a metainfo document from its encoded bytes.
    ///
    /// Version detection follows the key material present: no `meta version`
    /// key means v1; `meta version` without a flat `pieces` field means v2;
    /// both together mean hybrid.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let value = decode(data)?;
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info_value = dict
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?;
        let info_dict = info_value
            .as_dict()
            .ok_or(MetainfoError::InvalidField("info"))?;

        // Re-encoding the decoded section is canonical by construction, so
        // these are the exact bytes the identifying hash covers.
        let raw_info = Bytes::from(encode(info_value));

        let meta_version = info_dict
            .get(b"meta version".as_slice())
            .and_then(|v| v.as_integer());
        let has_pieces = info_dict.contains_key(b"pieces".as_slice());

        let version = match (meta_version, has_pieces) {
            (None, _) => ProtocolVersion::V1,
            (Some(_), false) => ProtocolVersion::V2,
            (Some(_), true) => ProtocolVersion::Hybrid,
        };

        let info_hash = match version {
            ProtocolVersion::V1 => InfoHash::V1(sha1_of(&raw_info)),
            ProtocolVersion::V2 => InfoHash::V2(sha256_of(&raw_info)),
            ProtocolVersion::Hybrid => InfoHash::Hybrid {
                v1: sha1_of(&raw_info),
                v2: sha256_of(&raw_info),
            },
        };

        let info = parse_info(info_dict, meta_version)?;

        let announce = dict
            .get(b"announce".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let announce_list = dict
            .get(b"announce-list".as_slice())
            .and_then(|v| v.as_list())
            .map(|tiers| {
                tiers
                    .iter()
                    .filter_map(|tier| {
                        tier.as_list().map(|urls| {
                            urls.iter()
                                .filter_map(|u| u.as_str().map(String::from))
                                .collect()
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let comment = dict
            .get(b"comment".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let created_by = dict
            .get(b"created by".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let creation_date = dict
            .get(b"creation date".as_slice())
            .and_then(|v| v.as_integer());

        let web_seeds = parse_url_entry(dict.get(b"url-list".as_slice()));
        let http_seeds = parse_url_entry(dict.get(b"httpseeds".as_slice()));

        let piece_layers = dict
            .get(b"piece layers".as_slice())
            .and_then(|v| v.as_dict())
            .map(|layers| {
                layers
                    .iter()
                    .filter_map(|(root, hashes)| {
                        hashes.as_bytes().map(|b| (root.clone(), b.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            info,
            info_hash,
            announce,
            announce_list,
            comment,
            created_by,
            creation_date,
            web_seeds,
            http_seeds,
            piece_layers,
            version,
            raw_info,
        })
    }

    /// Reads and parses a `.torrent` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetainfoError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// The canonically encoded info section the info hash covers.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    /// All tracker URLs, primary first, duplicates removed.
    pub fn trackers(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(announce) = &self.announce {
            urls.push(announce.clone());
        }
        for tier in &self.announce_list {
            for url in tier {
                if !urls.contains(url) {
                    urls.push(url.clone());
                }
            }
        }
        urls
    }
}

fn parse_info(
    dict: &BTreeMap<Bytes, Value>,
    meta_version: Option<i64>,
) -> Result<Info, MetainfoError> {
    let name = dict
        .get(b"name".as_slice())
        .and_then(|v| v.as_str())
        .ok_or(MetainfoError::MissingField("name"))?
        .to_string();

    let piece_length = dict
        .get(b"piece length".as_slice())
        .and_then(|v| v.as_integer())
        .ok_or(MetainfoError::MissingField("piece length"))? as u64;

    let private = dict
        .get(b"private".as_slice())
        .and_then(|v| v.as_integer())
        .is_some_and(|v| v == 1);

    let source = dict
        .get(b"source".as_slice())
        .and_then(|v| v.as_str())
        .map(String::from);

    let pieces = match dict.get(b"pieces".as_slice()) {
        Some(value) => {
            let bytes = value
                .as_bytes()
                .ok_or(MetainfoError::InvalidField("pieces"))?;
            if bytes.len() % 20 != 0 {
                return Err(MetainfoError::InvalidField("pieces"));
            }
            bytes.clone()
        }
        None => Bytes::new(),
    };

    let length = dict
        .get(b"length".as_slice())
        .and_then(|v| v.as_integer())
        .map(|l| l as u64);

    let files = match dict.get(b"files".as_slice()).and_then(|v| v.as_list()) {
        Some(entries) => parse_files_list(entries)?,
        None => Vec::new(),
    };

    let file_tree = dict
        .get(b"file tree".as_slice())
        .map(FileTree::from_value)
        .transpose()?;

    if length.is_none() && files.is_empty() && file_tree.is_none() {
        return Err(MetainfoError::MissingField("length, files, or file tree"));
    }

    Ok(Info {
        name,
        piece_length,
        private,
        source,
        meta_version,
        pieces,
        length,
        files,
        file_tree,
    })
}

fn parse_files_list(entries: &[Value]) -> Result<Vec<FileSpan>, MetainfoError> {
    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let dict = entry
            .as_dict()
            .ok_or(MetainfoError::InvalidField("files"))?;

        let length = dict
            .get(b"length".as_slice())
            .and_then(|v| v.as_integer())
            .ok_or(MetainfoError::MissingField("file length"))? as u64;

        let path: Vec<String> = dict
            .get(b"path".as_slice())
            .and_then(|v| v.as_list())
            .ok_or(MetainfoError::MissingField("file path"))?
            .iter()
            .filter_map(|seg| seg.as_str().map(String::from))
            .collect();
        if path.is_empty() {
            return Err(MetainfoError::InvalidField("file path"));
        }

        let attr = dict
            .get(b"attr".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        files.push(FileSpan { path, length, attr });
    }
    Ok(files)
}

/// `url-list` may be a single string or a list of strings; `httpseeds` is a
/// list. Both normalize to a vector here.
fn parse_url_entry(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(other) => other.as_str().map(String::from).into_iter().collect(),
        None => Vec::new(),
    }
}

pub(crate) fn sha1_of(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub(crate) fn sha256_of(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
