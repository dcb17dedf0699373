//! Reassembles loose content into the layout a metainfo document declares.
//!
//! Given one or more `.torrent` files and a scan root full of misplaced
//! files, the [`Assembler`] indexes the scan root by file name, matches every
//! declared entry by exact name and length, and copies matches into the
//! declared relative layout under a destination directory. Matching is
//! name+length only - no hashes are read - so a verification pass afterward
//! is the certainty step. Unmatched entries are simply not copied and show
//! up only in the returned count; existing destination files are never
//! overwritten.
//!
//! While the content index is scanned, the metainfo documents decode on one
//! auxiliary background thread; everything else is synchronous.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metainfo::{Metainfo, MetainfoError};

/// Fatal reassembly failures: broken I/O on the scan root or destination.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// A metainfo document could not be processed.
    #[error("metainfo error: {0}")]
    Metainfo(#[from] MetainfoError),

    /// Scanning or copying failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file discovered under the scan root.
#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    length: u64,
}

/// Relocates declared files from a scan root into a destination layout.
pub struct Assembler {
    metafiles: Vec<Metainfo>,
    filemap: HashMap<String, Vec<Candidate>>,
    dest: PathBuf,
}

impl Assembler {
    /// Prepares an assembler.
    ///
    /// `metafiles` may name `.torrent` files directly or directories to
    /// scan for them; undecodable documents are skipped. `contents` are the
    /// roots scanned for loose files (duplicate names are kept, one
    /// candidate each).
    pub fn new(
        metafiles: &[PathBuf],
        contents: &[PathBuf],
        dest: impl Into<PathBuf>,
    ) -> Result<Self, RebuildError> {
        let torrent_paths = collect_metafile_paths(metafiles)?;

        // Decode the documents while the content scan runs.
        let (parsed, filemap) = std::thread::scope(|scope| {
            let decoder = scope.spawn(|| load_metafiles(&torrent_paths));
            let filemap = index_contents(contents);
            let parsed = match decoder.join() {
                Ok(parsed) => parsed,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            (parsed, filemap)
        });

        Ok(Self {
            metafiles: parsed,
            filemap: filemap?,
            dest: dest.into(),
        })
    }

    /// Copies every matched entry into place and returns how many files
    /// were copied.
    pub fn assemble(&self) -> Result<usize, RebuildError> {
        let mut copied = 0;
        for meta in &self.metafiles {
            tracing::debug!(name = %meta.info.name, "matching declared files");
            for entry in declared_files(meta) {
                let Some(candidates) = self.filemap.get(&entry.filename) else {
                    continue;
                };
                let Some(found) = candidates.iter().find(|c| c.length == entry.length) else {
                    continue;
                };

                let dest_path = self.dest.join(&entry.rel);
                if dest_path.exists() {
                    continue;
                }
                if let Some(parent) = dest_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(&found.path, &dest_path)?;
                tracing::debug!(
                    from = %found.path.display(),
                    to = %dest_path.display(),
                    "copied match"
                );
                copied += 1;
            }
        }
        Ok(copied)
    }
}

/// One file a metainfo document expects, keyed for candidate lookup.
struct DeclaredFile {
    /// Destination path relative to the rebuild root (torrent name first).
    rel: PathBuf,
    /// Base name used to find candidates.
    filename: String,
    length: u64,
}

fn declared_files(meta: &Metainfo) -> Vec<DeclaredFile> {
    let name = &meta.info.name;

    if let Some(length) = meta.info.length {
        return vec![DeclaredFile {
            rel: PathBuf::from(name),
            filename: name.clone(),
            length,
        }];
    }

    if let Some(tree) = &meta.info.file_tree {
        return tree
            .flatten()
            .into_iter()
            .filter_map(|file| {
                let filename = file.path.file_name()?.to_str()?.to_string();
                Some(DeclaredFile {
                    rel: PathBuf::from(name).join(&file.path),
                    filename,
                    length: file.length,
                })
            })
            .collect();
    }

    meta.info
        .files
        .iter()
        .filter(|span| !span.is_padding())
        .filter_map(|span| {
            let filename = span.path.last()?.clone();
            let mut rel = PathBuf::from(name);
            for segment in &span.path {
                rel.push(segment);
            }
            Some(DeclaredFile {
                rel,
                filename,
                length: span.length,
            })
        })
        .collect()
}

fn collect_metafile_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, RebuildError> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let child = entry.path();
                if child.is_file() && has_torrent_extension(&child) {
                    found.push(child);
                }
            }
        } else if path.is_file() {
            found.push(path.clone());
        }
    }
    Ok(found)
}

fn has_torrent_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("torrent"))
}

fn load_metafiles(paths: &[PathBuf]) -> Vec<Metainfo> {
    let mut parsed = Vec::with_capacity(paths.len());
    for path in paths {
        match Metainfo::load(path) {
            Ok(meta) => parsed.push(meta),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping metafile");
            }
        }
    }
    parsed
}

fn index_contents(roots: &[PathBuf]) -> Result<HashMap<String, Vec<Candidate>>, RebuildError> {
    let mut map = HashMap::new();
    for root in roots {
        index_path(root, &mut map)?;
    }
    Ok(map)
}

fn index_path(
    path: &Path,
    map: &mut HashMap<String, Vec<Candidate>>,
) -> Result<(), RebuildError> {
    if path.is_file() {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            let length = path.metadata()?.len();
            map.entry(name.to_string()).or_default().push(Candidate {
                path: path.to_path_buf(),
                length,
            });
        }
    } else if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            index_path(&entry?.path(), map)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
