use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::HasherError;
use super::merkle::{hash_block, merkle_root, zero_piece_root, BLOCK_SIZE, ZERO_HASH};
use crate::cancel::CancelToken;

/// Per-file v2 merkle hashes.
///
/// `root` identifies the file in the `file tree`; `piece_layer` holds one
/// merkle hash per full piece and is empty for files no longer than one
/// piece, which are identified by their root alone.
#[derive(Debug, Clone)]
pub struct FileMerkle {
    /// Merkle root over the file's padded layer hashes.
    pub root: [u8; 32],
    /// One hash per piece, in order. Empty when the file fits in one piece.
    pub piece_layer: Vec<[u8; 32]>,
}

impl FileMerkle {
    /// Streams a file in 16 KiB blocks and builds its merkle hashes.
    ///
    /// Blocks are grouped `piece_length / 16 KiB` at a time; each group
    /// reduces to one layer hash, and the layer hashes reduce to the root.
    /// Memory stays at one block buffer plus the collected hashes. Intended
    /// for non-empty files - zero-length files carry no hash data in the
    /// metainfo and should not reach the hasher.
    pub fn from_path(
        path: &Path,
        piece_length: u64,
        cancel: &CancelToken,
    ) -> Result<Self, HasherError> {
        tracing::debug!(path = %path.display(), "hashing v2 merkle tree");
        let mut file = File::open(path)?;
        let blocks_per_piece = piece_length as usize / BLOCK_SIZE;
        let mut layer_hashes = Vec::new();
        let mut block = vec![0u8; BLOCK_SIZE];

        loop {
            let (leaves, eof) = read_block_group(&mut file, &mut block, blocks_per_piece, cancel)?;
            if leaves.is_empty() {
                break;
            }
            layer_hashes.push(finish_group(leaves, blocks_per_piece, layer_hashes.is_empty()));
            if eof {
                break;
            }
        }

        Ok(Self::from_layer_hashes(layer_hashes, blocks_per_piece))
    }

    /// Combines collected layer hashes into the final root.
    ///
    /// A multi-piece file pads its layer list to the next power of two using
    /// the root of an all-zero block group as filler before the final merkle
    /// reduction.
    pub(crate) fn from_layer_hashes(
        layer_hashes: Vec<[u8; 32]>,
        blocks_per_piece: usize,
    ) -> Self {
        match layer_hashes.len() {
            0 => Self {
                root: ZERO_HASH,
                piece_layer: Vec::new(),
            },
            1 => Self {
                root: layer_hashes[0],
                piece_layer: Vec::new(),
            },
            n => {
                let piece_layer = layer_hashes.clone();
                let mut padded = layer_hashes;
                padded.resize(n.next_power_of_two(), zero_piece_root(blocks_per_piece));
                Self {
                    root: merkle_root(padded),
                    piece_layer,
                }
            }
        }
    }
}

/// Reads up to one piece worth of blocks, hashing each into a leaf.
///
/// Returns the leaves together with whether the end of the file was reached
/// inside this group.
pub(crate) fn read_block_group(
    file: &mut File,
    block: &mut [u8],
    blocks_per_piece: usize,
    cancel: &CancelToken,
) -> Result<(Vec<[u8; 32]>, bool), HasherError> {
    let mut leaves = Vec::with_capacity(blocks_per_piece);
    for _ in 0..blocks_per_piece {
        if cancel.is_cancelled() {
            return Err(HasherError::Cancelled);
        }
        let n = read_full(file, block)?;
        if n == 0 {
            return Ok((leaves, true));
        }
        leaves.push(hash_block(&block[..n]));
        if n < block.len() {
            return Ok((leaves, true));
        }
    }
    Ok((leaves, false))
}

/// Pads a short block group and reduces it to its layer hash.
///
/// A short group is always the file's last. When it is also the first (the
/// whole file is smaller than one piece) the leaf count pads to its next
/// power of two; the trailing group of a multi-piece file pads to the full
/// per-piece block count. Filler is the fixed zero digest either way.
pub(crate) fn finish_group(
    mut leaves: Vec<[u8; 32]>,
    blocks_per_piece: usize,
    first_group: bool,
) -> [u8; 32] {
    if leaves.len() < blocks_per_piece {
        let target = if first_group {
            leaves.len().next_power_of_two()
        } else {
            blocks_per_piece
        };
        leaves.resize(target, ZERO_HASH);
    }
    merkle_root(leaves)
}

/// Reads until the buffer is full or the file ends.
pub(crate) fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
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
