//! BitTorrent v2 file tree ([BEP-52]).
//!
//! v2 torrents describe their contents as a tree of dictionaries keyed by
//! path segment. A leaf is marked by an empty-string key whose value holds
//! the file's length and, for non-empty files, the merkle root of its
//! blocks. The tree here is an explicit tagged enum built and consumed by
//! pure recursive functions.
//!
//! [BEP-52]: http://bittorrent.org/beps/bep_0052.html

use std::collections::BTreeMap;
use std::path::PathBuf;

use bytes::Bytes;

use super::error::MetainfoError;
use crate::bencode::Value;

/// A node in a v2 file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTree {
    /// A file: its length and, when non-empty, its merkle root.
    File {
        length: u64,
        pieces_root: Option<[u8; 32]>,
    },
    /// A directory of named children, ordered by name.
    Dir(BTreeMap<String, FileTree>),
}

/// One file pulled out of a tree by [`FileTree::flatten`].
#[derive(Debug, Clone)]
pub struct TreeFile {
    /// Path relative to the torrent root, one component per tree level.
    pub path: PathBuf,
    /// File length in bytes.
    pub length: u64,
    /// Merkle root; absent for zero-length files.
    pub pieces_root: Option<[u8; 32]>,
}

impl FileTree {
    /// Creates an empty directory node.
    pub fn empty_dir() -> Self {
        FileTree::Dir(BTreeMap::new())
    }

    /// Parses the `file tree` dictionary from a v2 info section.
    pub fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        let dict = value
            .as_dict()
            .ok_or(MetainfoError::InvalidField("file tree"))?;

        // A zero-length key marks a file node; its value holds the details.
        if let Some(details) = dict.get(b"".as_slice()) {
            let details = details
                .as_dict()
                .ok_or(MetainfoError::InvalidField("file tree entry"))?;
            let length = details
                .get(b"length".as_slice())
                .and_then(|v| v.as_integer())
                .ok_or(MetainfoError::MissingField("file tree length"))?
                as u64;
            let pieces_root = details
                .get(b"pieces root".as_slice())
                .and_then(|v| v.as_bytes())
                .and_then(|b| <[u8; 32]>::try_from(b.as_ref()).ok());
            return Ok(FileTree::File {
                length,
                pieces_root,
            });
        }

        let mut children = BTreeMap::new();
        for (key, child) in dict {
            let name = std::str::from_utf8(key)
                .map_err(|_| MetainfoError::InvalidField("file tree key"))?;
            children.insert(name.to_string(), FileTree::from_value(child)?);
        }
        Ok(FileTree::Dir(children))
    }

    /// Serializes the tree back into its dictionary form.
    pub fn to_value(&self) -> Value {
        match self {
            FileTree::File {
                length,
                pieces_root,
            } => {
                let mut details = BTreeMap::new();
                details.insert(Bytes::from_static(b"length"), Value::Integer(*length as i64));
                if let Some(root) = pieces_root {
                    details.insert(
                        Bytes::from_static(b"pieces root"),
                        Value::Bytes(Bytes::copy_from_slice(root)),
                    );
                }
                let mut node = BTreeMap::new();
                node.insert(Bytes::from_static(b""), Value::Dict(details));
                Value::Dict(node)
            }
            FileTree::Dir(children) => {
                let mut node = BTreeMap::new();
                for (name, child) in children {
                    node.insert(Bytes::from(name.clone()), child.to_value());
                }
                Value::Dict(node)
            }
        }
    }

    /// Inserts a file at the given path, creating directories along the way.
    ///
    /// Self must be a directory node. A path segment that already names a
    /// file is a conflict.
    pub fn insert(&mut self, segments: &[String], leaf: FileTree) -> Result<(), MetainfoError> {
        let FileTree::Dir(children) = self else {
            return Err(MetainfoError::InvalidField("file tree path conflict"));
        };
        match segments {
            [] => Err(MetainfoError::InvalidField("empty file tree path")),
            [name] => {
                children.insert(name.clone(), leaf);
                Ok(())
            }
            [name, rest @ ..] => children
                .entry(name.clone())
                .or_insert_with(FileTree::empty_dir)
                .insert(rest, leaf),
        }
    }

    /// Collects every file in depth-first tree order with its full path.
    pub fn flatten(&self) -> Vec<TreeFile> {
        let mut files = Vec::new();
        collect(self, PathBuf::new(), &mut files);
        files
    }
}

fn collect(tree: &FileTree, at: PathBuf, out: &mut Vec<TreeFile>) {
    match tree {
        FileTree::File {
            length,
            pieces_root,
        } => out.push(TreeFile {
            path: at,
            length: *length,
            pieces_root: *pieces_root,
        }),
        FileTree::Dir(children) => {
            for (name, child) in children {
                collect(child, at.join(name), out);
            }
        }
    }
}
