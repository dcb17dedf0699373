//! Bounded field edits on persisted metainfo documents.
//!
//! Only announce URLs, the comment, the source tag, the private flag, and
//! web seeds can change; content hashes and the file layout never do. Note
//! that `source` and `private` live inside the info section, so editing them
//! produces a new info hash and the torrent leaves its original swarm.

use std::path::Path;

use bytes::Bytes;

use super::error::MetainfoError;
use crate::bencode::{decode, encode, Value};

/// The set of fields a single edit may change.
///
/// `None` leaves a field untouched. An empty string or empty list removes
/// the field from the document.
#[derive(Debug, Clone, Default)]
pub struct FieldEdits {
    /// Replacement tracker URLs (`announce` + `announce-list`).
    pub announce: Option<Vec<String>>,
    /// Replacement comment.
    pub comment: Option<String>,
    /// Replacement private-tracker source tag.
    pub source: Option<String>,
    /// Set or clear the private flag.
    pub private: Option<bool>,
    /// Replacement web seed URLs (`url-list`).
    pub web_seeds: Option<Vec<String>>,
}

impl FieldEdits {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.announce.is_none()
            && self.comment.is_none()
            && self.source.is_none()
            && self.private.is_none()
            && self.web_seeds.is_none()
    }
}

/// Applies `edits` to the document at `path`, rewriting it in place.
///
/// The rewrite is atomic: the new document is written to a sibling temp file
/// and renamed over the original. Returns the edited document.
pub fn edit_torrent(path: impl AsRef<Path>, edits: &FieldEdits) -> Result<Value, MetainfoError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let mut document = decode(&data)?;

    apply_edits(&mut document, edits)?;

    let encoded = encode(&document);
    let tmp = path.with_extension("torrent.tmp");
    std::fs::write(&tmp, &encoded)?;
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "rewrote metainfo document");
    Ok(document)
}

fn apply_edits(document: &mut Value, edits: &FieldEdits) -> Result<(), MetainfoError> {
    let root = document
        .as_dict_mut()
        .ok_or(MetainfoError::InvalidField("root"))?;
    if !root.contains_key(b"info".as_slice()) {
        return Err(MetainfoError::MissingField("info"));
    }

    if let Some(urls) = &edits.announce {
        if urls.is_empty() {
            root.remove(b"announce".as_slice());
            root.remove(b"announce-list".as_slice());
        } else {
            root.insert(
                Bytes::from_static(b"announce"),
                Value::from(urls[0].clone()),
            );
            let tiers: Vec<Value> = urls
                .iter()
                .map(|url| Value::List(vec![Value::from(url.clone())]))
                .collect();
            root.insert(Bytes::from_static(b"announce-list"), Value::List(tiers));
        }
    }

    if let Some(comment) = &edits.comment {
        if comment.is_empty() {
            root.remove(b"comment".as_slice());
        } else {
            root.insert(Bytes::from_static(b"comment"), Value::from(comment.clone()));
        }
    }

    if let Some(seeds) = &edits.web_seeds {
        if seeds.is_empty() {
            root.remove(b"url-list".as_slice());
        } else {
            let urls: Vec<Value> = seeds.iter().map(|u| Value::from(u.clone())).collect();
            root.insert(Bytes::from_static(b"url-list"), Value::List(urls));
        }
    }

    let info = root
        .get_mut(b"info".as_slice())
        .and_then(|v| v.as_dict_mut())
        .ok_or(MetainfoError::InvalidField("info"))?;

    if let Some(source) = &edits.source {
        if source.is_empty() {
            info.remove(b"source".as_slice());
        } else {
            info.insert(Bytes::from_static(b"source"), Value::from(source.clone()));
        }
    }

    if let Some(private) = edits.private {
        if private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        } else {
            info.remove(b"private".as_slice());
        }
    }

    Ok(())
}
