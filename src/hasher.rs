//! Piece and merkle hashing for torrent creation and verification.
//!
//! The same engine backs both directions: the builder derives digests while
//! walking fresh content, and the verifier re-derives them from disk to
//! compare against a stored document.
//!
//! Three hashing modes exist:
//!
//! - **v1** ([`PieceFeed`]): all files concatenated into one logical stream,
//!   SHA1 per piece-length chunk, order-significant.
//! - **v2** ([`FileMerkle`]): each file hashed independently into a merkle
//!   tree of SHA256 16 KiB block hashes ([BEP-52]), yielding a per-file root
//!   and, for multi-piece files, a piece layer.
//! - **hybrid** ([`HybridFileMerkle`]): both of the above from a single read
//!   pass per file, with zero padding so files align to piece boundaries.
//!
//! All hashers stream: memory stays at one piece or one block buffer no
//! matter the file size, and every read loop checks a
//! [`CancelToken`](crate::CancelToken).
//!
//! [BEP-52]: http://bittorrent.org/beps/bep_0052.html

mod error;
mod hybrid;
mod merkle;
mod piece_length;
mod v1;
mod v2;

pub use error::HasherError;
pub use hybrid::HybridFileMerkle;
pub use merkle::{hash_block, merkle_root, zero_piece_root, BLOCK_SIZE, ZERO_HASH};
pub use piece_length::{
    normalize_piece_length, piece_length_for, MAX_PIECE_LENGTH, MIN_PIECE_LENGTH,
};
pub use v1::PieceFeed;
pub use v2::FileMerkle;

#[cfg(test)]
mod tests;
