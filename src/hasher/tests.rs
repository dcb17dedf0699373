use super::*;
use crate::cancel::CancelToken;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

fn sha1_of(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[test]
fn piece_length_for_stays_in_range_and_grows() {
    let sizes = [
        0u64,
        1,
        1 << 14,
        1 << 20,
        50 << 20,
        500 << 20,
        4 << 30,
        100 << 30,
    ];
    let mut last = 0;
    for size in sizes {
        let length = piece_length_for(size);
        assert!(length.is_power_of_two());
        assert!((MIN_PIECE_LENGTH..=MAX_PIECE_LENGTH).contains(&length));
        assert!(length >= last, "piece length shrank at size {}", size);
        last = length;
    }
    assert_eq!(piece_length_for(100 << 30), MAX_PIECE_LENGTH);
}

#[test]
fn normalize_accepts_bytes_and_exponents() {
    assert_eq!(normalize_piece_length(16).unwrap(), 1 << 16);
    assert_eq!(normalize_piece_length(1 << 18).unwrap(), 1 << 18);
    assert!(matches!(
        normalize_piece_length(1 << 24),
        Err(HasherError::PieceLength(_))
    ));
    assert!(normalize_piece_length(30000).is_err());
    assert!(normalize_piece_length(0).is_err());
}

#[test]
fn merkle_root_reduces_pairs() {
    let a = [1u8; 32];
    let b = [2u8; 32];
    let single = merkle_root(vec![a]);
    assert_eq!(single, a);

    let pair = merkle_root(vec![a, b]);
    let quad = merkle_root(vec![a, b, a, b]);
    assert_ne!(pair, a);
    assert_eq!(quad, merkle_root(vec![pair, pair]));
}

#[test]
fn v1_feed_crosses_file_boundaries() {
    let dir = TempDir::new().unwrap();
    let first = vec![0xAAu8; BLOCK_SIZE];
    let second = vec![0xBBu8; BLOCK_SIZE / 2];
    let paths = vec![
        write_file(&dir, "a.bin", &first),
        write_file(&dir, "b.bin", &second),
    ];

    let piece_length = BLOCK_SIZE as u64;
    let feed = PieceFeed::new(paths, piece_length, CancelToken::new());
    let pieces: Vec<[u8; 20]> = feed.map(|p| p.unwrap()).collect();

    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0], sha1_of(&first));
    assert_eq!(pieces[1], sha1_of(&second));
}

#[test]
fn v1_feed_spans_small_files_into_one_piece() {
    let dir = TempDir::new().unwrap();
    let parts: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 1000]).collect();
    let paths: Vec<PathBuf> = parts
        .iter()
        .enumerate()
        .map(|(i, data)| write_file(&dir, &format!("f{}", i), data))
        .collect();

    let feed = PieceFeed::new(paths, (BLOCK_SIZE * 4) as u64, CancelToken::new());
    let pieces: Vec<[u8; 20]> = feed.map(|p| p.unwrap()).collect();

    let combined: Vec<u8> = parts.concat();
    assert_eq!(pieces, vec![sha1_of(&combined)]);
}

#[test]
fn v1_feed_skips_empty_files() {
    let dir = TempDir::new().unwrap();
    let data = vec![0x42u8; 100];
    let paths = vec![
        write_file(&dir, "empty1", b""),
        write_file(&dir, "data", &data),
        write_file(&dir, "empty2", b""),
    ];

    let feed = PieceFeed::new(paths, BLOCK_SIZE as u64, CancelToken::new());
    let pieces: Vec<[u8; 20]> = feed.map(|p| p.unwrap()).collect();
    assert_eq!(pieces, vec![sha1_of(&data)]);
}

#[test]
fn v1_feed_stops_when_cancelled() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write_file(&dir, "a", &[0u8; 64])];
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut feed = PieceFeed::new(paths, BLOCK_SIZE as u64, cancel);
    assert!(matches!(feed.next(), Some(Err(HasherError::Cancelled))));
    assert!(feed.next().is_none());
}

#[test]
fn single_block_file_root_is_block_hash() {
    let dir = TempDir::new().unwrap();
    let data = vec![0xCDu8; BLOCK_SIZE];
    let path = write_file(&dir, "one.bin", &data);

    let fm = FileMerkle::from_path(&path, BLOCK_SIZE as u64, &CancelToken::new()).unwrap();
    assert_eq!(fm.root, hash_block(&data));
    assert!(fm.piece_layer.is_empty());
}

#[test]
fn sub_piece_file_pads_leaves_to_power_of_two() {
    let dir = TempDir::new().unwrap();
    // Three blocks in a four-block piece: pads to four leaves, not the
    // per-piece count, because the file has a single group.
    let data = vec![0x11u8; BLOCK_SIZE * 3];
    let path = write_file(&dir, "three.bin", &data);

    let fm = FileMerkle::from_path(&path, (BLOCK_SIZE * 8) as u64, &CancelToken::new()).unwrap();
    let leaves: Vec<[u8; 32]> = data.chunks(BLOCK_SIZE).map(hash_block).collect();
    let expected = merkle_root(vec![leaves[0], leaves[1], leaves[2], ZERO_HASH]);
    assert_eq!(fm.root, expected);
    assert!(fm.piece_layer.is_empty());
}

#[test]
fn multi_piece_file_gets_a_piece_layer() {
    let dir = TempDir::new().unwrap();
    let piece_length = (BLOCK_SIZE * 2) as u64;
    // Two and a half pieces.
    let data = vec![0x33u8; BLOCK_SIZE * 5];
    let path = write_file(&dir, "big.bin", &data);

    let fm = FileMerkle::from_path(&path, piece_length, &CancelToken::new()).unwrap();
    assert_eq!(fm.piece_layer.len(), 3);

    let leaves: Vec<[u8; 32]> = data.chunks(BLOCK_SIZE).map(hash_block).collect();
    assert_eq!(fm.piece_layer[0], merkle_root(vec![leaves[0], leaves[1]]));
    assert_eq!(fm.piece_layer[1], merkle_root(vec![leaves[2], leaves[3]]));
    // Trailing group pads to the full per-piece block count.
    assert_eq!(fm.piece_layer[2], merkle_root(vec![leaves[4], ZERO_HASH]));

    // Root reduces the layer padded to a power of two with zero-piece roots.
    let filler = zero_piece_root(2);
    let expected_root = merkle_root(vec![
        fm.piece_layer[0],
        fm.piece_layer[1],
        fm.piece_layer[2],
        filler,
    ]);
    assert_eq!(fm.root, expected_root);
}

#[test]
fn merkle_is_deterministic_and_byte_sensitive() {
    let dir = TempDir::new().unwrap();
    let piece_length = (BLOCK_SIZE * 2) as u64;
    let mut data = vec![0x77u8; BLOCK_SIZE * 3];
    let path = write_file(&dir, "orig.bin", &data);

    let first = FileMerkle::from_path(&path, piece_length, &CancelToken::new()).unwrap();
    let second = FileMerkle::from_path(&path, piece_length, &CancelToken::new()).unwrap();
    assert_eq!(first.root, second.root);
    assert_eq!(first.piece_layer, second.piece_layer);

    data[BLOCK_SIZE + 7] ^= 0x01;
    let flipped = write_file(&dir, "flip.bin", &data);
    let third = FileMerkle::from_path(&flipped, piece_length, &CancelToken::new()).unwrap();
    assert_ne!(first.root, third.root);
}

#[test]
fn hybrid_matches_v2_and_v1_for_the_same_content() {
    let dir = TempDir::new().unwrap();
    let piece_length = (BLOCK_SIZE * 2) as u64;
    let data = vec![0x5Au8; BLOCK_SIZE * 3 + 100];
    let path = write_file(&dir, "payload.bin", &data);

    let v2 = FileMerkle::from_path(&path, piece_length, &CancelToken::new()).unwrap();
    let hybrid =
        HybridFileMerkle::from_path(&path, piece_length, false, &CancelToken::new()).unwrap();

    assert_eq!(hybrid.root, v2.root);
    assert_eq!(hybrid.piece_layer, v2.piece_layer);
    assert_eq!(hybrid.pad_length, 0);

    // Without padding the v1 pieces equal the plain stream digests.
    let feed = PieceFeed::new(vec![path], piece_length, CancelToken::new());
    let stream: Vec<[u8; 20]> = feed.map(|p| p.unwrap()).collect();
    assert_eq!(hybrid.pieces, stream);
}

#[test]
fn hybrid_pads_final_piece_to_boundary() {
    let dir = TempDir::new().unwrap();
    let piece_length = (BLOCK_SIZE * 2) as u64;
    let data = vec![0x99u8; BLOCK_SIZE + 123];
    let path = write_file(&dir, "short.bin", &data);

    let hybrid =
        HybridFileMerkle::from_path(&path, piece_length, true, &CancelToken::new()).unwrap();

    let expected_pad = piece_length - data.len() as u64;
    assert_eq!(hybrid.pad_length, expected_pad);
    assert_eq!(hybrid.pieces.len(), 1);

    let mut padded = data.clone();
    padded.resize(piece_length as usize, 0);
    assert_eq!(hybrid.pieces[0], sha1_of(&padded));
}

#[test]
fn hybrid_aligned_file_needs_no_padding() {
    let dir = TempDir::new().unwrap();
    let piece_length = (BLOCK_SIZE * 2) as u64;
    let data = vec![0x10u8; piece_length as usize * 2];
    let path = write_file(&dir, "aligned.bin", &data);

    let hybrid =
        HybridFileMerkle::from_path(&path, piece_length, true, &CancelToken::new()).unwrap();
    assert_eq!(hybrid.pad_length, 0);
    assert_eq!(hybrid.pieces.len(), 2);
}
