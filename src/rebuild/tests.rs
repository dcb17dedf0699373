use super::*;
use crate::hasher::BLOCK_SIZE;
use crate::metainfo::{ProtocolVersion, TorrentBuilder};
use crate::verify::Checker;
use std::fs;
use tempfile::TempDir;

const PIECE: u64 = BLOCK_SIZE as u64;

fn write_file(dir: &Path, name: &str, data: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

/// Content, its torrent, and a scattered copy of every file under random
/// other directory names.
fn fixture(version: ProtocolVersion) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("release");
    write_file(&content, "one.bin", &vec![0x11u8; PIECE as usize + 100]);
    write_file(&content, "docs/two.txt", &vec![0x22u8; 3000]);
    write_file(&content, "three.bin", &vec![0x33u8; 500]);

    let torrent = TorrentBuilder::new(&content)
        .version(version)
        .tracker("http://tracker.example.com/announce")
        .piece_length(PIECE)
        .build()
        .unwrap();
    let torrent_path = dir.path().join("release.torrent");
    torrent.write_to(&torrent_path).unwrap();

    // Scatter the files under unrelated directory names.
    let scattered = dir.path().join("loose");
    write_file(
        &scattered,
        "misc/one.bin",
        &fs::read(content.join("one.bin")).unwrap(),
    );
    write_file(
        &scattered,
        "backup/old/two.txt",
        &fs::read(content.join("docs/two.txt")).unwrap(),
    );
    write_file(
        &scattered,
        "three.bin",
        &fs::read(content.join("three.bin")).unwrap(),
    );

    (dir, torrent_path, scattered)
}

#[test]
fn rebuilds_every_declared_file() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V1);
    let dest = dir.path().join("rebuilt");

    let assembler = Assembler::new(
        &[torrent_path],
        &[scattered],
        &dest,
    )
    .unwrap();
    let copied = assembler.assemble().unwrap();
    assert_eq!(copied, 3);

    assert!(dest.join("release/one.bin").is_file());
    assert!(dest.join("release/docs/two.txt").is_file());
    assert!(dest.join("release/three.bin").is_file());
}

#[test]
fn rebuilt_layout_verifies_completely() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V1);
    let dest = dir.path().join("rebuilt");

    Assembler::new(&[torrent_path.clone()], &[scattered], &dest)
        .unwrap()
        .assemble()
        .unwrap();

    let report = Checker::new(&torrent_path, dest.join("release"))
        .unwrap()
        .check()
        .unwrap();
    assert_eq!(report.percent(), 100);
}

#[test]
fn rebuilds_v2_layout() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V2);
    let dest = dir.path().join("rebuilt");

    let copied = Assembler::new(&[torrent_path], &[scattered], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(copied, 3);
    assert!(dest.join("release/docs/two.txt").is_file());
}

#[test]
fn wrong_length_candidates_are_excluded() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V1);
    let dest = dir.path().join("rebuilt");

    // Same name, different size: must not be used.
    let target = scattered.join("misc/one.bin");
    let data = fs::read(&target).unwrap();
    fs::write(&target, &data[..100]).unwrap();

    let copied = Assembler::new(&[torrent_path], &[scattered], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(copied, 2);
    assert!(!dest.join("release/one.bin").exists());
}

#[test]
fn existing_destinations_are_never_overwritten() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V1);
    let dest = dir.path().join("rebuilt");

    let first = Assembler::new(&[torrent_path.clone()], &[scattered.clone()], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(first, 3);

    let second = Assembler::new(&[torrent_path], &[scattered], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(second, 0);
}

#[test]
fn accepts_a_directory_of_metafiles() {
    let (dir, torrent_path, scattered) = fixture(ProtocolVersion::V1);
    let dest = dir.path().join("rebuilt");

    // Point at the directory holding the .torrent instead of the file, with
    // an undecodable sibling that must be skipped.
    let meta_dir = torrent_path.parent().unwrap().to_path_buf();
    fs::write(meta_dir.join("broken.torrent"), b"garbage").unwrap();

    let copied = Assembler::new(&[meta_dir], &[scattered], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(copied, 3);
}

#[test]
fn unmatched_entries_are_counted_out_not_raised() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("release");
    write_file(&content, "only.bin", &vec![0x44u8; 1000]);

    let torrent = TorrentBuilder::new(&content)
        .tracker("http://tracker.example.com/announce")
        .piece_length(PIECE)
        .build()
        .unwrap();
    let torrent_path = dir.path().join("release.torrent");
    torrent.write_to(&torrent_path).unwrap();

    let empty_scan = dir.path().join("nothing-here");
    fs::create_dir_all(&empty_scan).unwrap();
    let dest = dir.path().join("rebuilt");

    let copied = Assembler::new(&[torrent_path], &[empty_scan], &dest)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(copied, 0);
}
