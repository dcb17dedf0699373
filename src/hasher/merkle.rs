use sha2::{Digest, Sha256};

/// Leaf size for v2 merkle hashing: 16 KiB per [BEP-52].
///
/// [BEP-52]: http://bittorrent.org/beps/bep_0052.html
pub const BLOCK_SIZE: usize = 16384;

/// The fixed all-zero digest used to pad incomplete block groups.
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

/// SHA256 of a single content block.
pub fn hash_block(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Reduces a layer of hashes to its merkle root.
///
/// Adjacent pairs combine as `SHA256(left || right)`, halving the layer until
/// one hash remains; a single-element layer is returned unchanged. The input
/// length must be a power of two - padding to that shape is the caller's
/// job, since the correct filler differs between block groups and the root
/// layer.
pub fn merkle_root(mut layer: Vec<[u8; 32]>) -> [u8; 32] {
    debug_assert!(!layer.is_empty() && layer.len().is_power_of_two());
    while layer.len() > 1 {
        layer = layer
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

/// Merkle root of a block group consisting entirely of zero hashes.
///
/// Used as the filler when padding a file's layer-hash list up to a power of
/// two: the absent trailing pieces behave as if they were all-zero groups.
pub fn zero_piece_root(blocks_per_piece: usize) -> [u8; 32] {
    merkle_root(vec![ZERO_HASH; blocks_per_piece.next_power_of_two()])
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
