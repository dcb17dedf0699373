use std::fs::File;
use std::path::Path;

use sha1::{Digest, Sha1};

use super::error::HasherError;
use super::merkle::{hash_block, BLOCK_SIZE};
use super::v2::{finish_group, read_full, FileMerkle};
use crate::cancel::CancelToken;

/// Per-file hashes for a hybrid torrent, computed in one pass.
///
/// Every 16 KiB block read from disk feeds both the SHA256 merkle leaves and
/// a running SHA1 piece digest, so hybrid creation reads each file exactly
/// once. In a hybrid layout every file except the last is followed by a
/// synthetic zero-filled padding file so that the next file starts on a
/// piece boundary; with `pad_v1` set, the trailing partial piece is
/// zero-extended to the boundary and [`pad_length`](Self::pad_length)
/// reports how much padding the caller must declare.
#[derive(Debug, Clone)]
pub struct HybridFileMerkle {
    /// Merkle root over the file's padded layer hashes.
    pub root: [u8; 32],
    /// One merkle hash per piece; empty for files within one piece.
    pub piece_layer: Vec<[u8; 32]>,
    /// SHA1 digests of this file's v1 pieces, in order.
    pub pieces: Vec<[u8; 20]>,
    /// Zero bytes folded into the final v1 piece to reach the boundary.
    /// Zero when the file already ends on a boundary or `pad_v1` was false.
    pub pad_length: u64,
}

impl HybridFileMerkle {
    /// Hashes one file for a hybrid torrent.
    pub fn from_path(
        path: &Path,
        piece_length: u64,
        pad_v1: bool,
        cancel: &CancelToken,
    ) -> Result<Self, HasherError> {
        tracing::debug!(path = %path.display(), "hashing hybrid file (v1 + v2)");
        let mut file = File::open(path)?;
        let piece_length = piece_length as usize;
        let blocks_per_piece = piece_length / BLOCK_SIZE;

        let mut layer_hashes = Vec::new();
        let mut pieces: Vec<[u8; 20]> = Vec::new();
        let mut pad_length = 0u64;
        let mut block = vec![0u8; BLOCK_SIZE];

        loop {
            let mut leaves = Vec::with_capacity(blocks_per_piece);
            let mut sha1 = Sha1::new();
            let mut group_bytes = 0usize;
            let mut eof = false;

            for _ in 0..blocks_per_piece {
                if cancel.is_cancelled() {
                    return Err(HasherError::Cancelled);
                }
                let n = read_full(&mut file, &mut block)?;
                if n == 0 {
                    eof = true;
                    break;
                }
                leaves.push(hash_block(&block[..n]));
                sha1.update(&block[..n]);
                group_bytes += n;
                if n < BLOCK_SIZE {
                    eof = true;
                    break;
                }
            }

            if leaves.is_empty() {
                break;
            }
            layer_hashes.push(finish_group(leaves, blocks_per_piece, layer_hashes.is_empty()));

            if group_bytes < piece_length && pad_v1 {
                let deficit = piece_length - group_bytes;
                pad_length = deficit as u64;
                block.fill(0);
                let mut left = deficit;
                while left > 0 {
                    let take = left.min(block.len());
                    sha1.update(&block[..take]);
                    left -= take;
                }
            }
            pieces.push(sha1.finalize().into());

            if eof {
                break;
            }
        }

        let FileMerkle { root, piece_layer } =
            FileMerkle::from_layer_hashes(layer_hashes, blocks_per_piece);
        Ok(Self {
            root,
            piece_layer,
            pieces,
            pad_length,
        })
    }
}
