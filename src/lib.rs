//! torrentkit - create, edit, verify, and rebuild BitTorrent metainfo files.
//!
//! The crate covers the static-metadata side of BitTorrent: it never talks
//! to peers, trackers, or the DHT. It works on `.torrent` documents and
//! local filesystem content across all three wire variants - v1 (BEP-3),
//! v2 (BEP-52), and hybrid (BEP-47).
//!
//! # Modules
//!
//! - [`bencode`] - canonical sorted-key codec for the wire format
//! - [`hasher`] - v1 piece hashing and v2/hybrid merkle trees, streaming
//! - [`metainfo`] - document model, parser, builder, and field edits
//! - [`verify`] - streaming content verification with graceful degradation
//! - [`rebuild`] - relocate loose files into a torrent's declared layout
//! - [`cancel`] - cooperative cancellation for long hash runs
//!
//! # Creating and checking a torrent
//!
//! ```no_run
//! use torrentkit::{Checker, ProtocolVersion, TorrentBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let torrent = TorrentBuilder::new("media/show")
//!     .version(ProtocolVersion::Hybrid)
//!     .tracker("http://tracker.example.com/announce")
//!     .build()?;
//! let path = torrent.write()?;
//!
//! let report = Checker::new(&path, "media/show")?.check()?;
//! assert_eq!(report.percent(), 100);
//! # Ok(())
//! # }
//! ```

pub mod bencode;
pub mod cancel;
pub mod hasher;
pub mod metainfo;
pub mod rebuild;
pub mod verify;

pub use bencode::{decode, decode_prefix, encode, BencodeError, Value};
pub use cancel::CancelToken;
pub use hasher::{
    piece_length_for, FileMerkle, HasherError, HybridFileMerkle, PieceFeed, BLOCK_SIZE,
};
pub use metainfo::{
    edit_torrent, FieldEdits, FileSpan, FileTree, Info, InfoHash, Metainfo, MetainfoError,
    ProtocolVersion, Torrent, TorrentBuilder,
};
pub use rebuild::{Assembler, RebuildError};
pub use verify::{Checker, Report, VerifyError};
