//! Torrent metainfo documents: model, parser, builder, and field edits.
//!
//! A metainfo (`.torrent`) file is a bencoded dictionary describing tracked
//! content: names, lengths, piece hashes, and tracker URLs. Three wire
//! variants exist - v1 ([BEP-3]), v2 ([BEP-52]), and hybrid ([BEP-47]) -
//! distinguished by which hash material the info section carries.
//!
//! - [`Metainfo`] parses any variant and exposes the document model.
//! - [`TorrentBuilder`] creates documents from content on disk.
//! - [`edit_torrent`] performs the bounded field-edit operation on a
//!   persisted document.
//!
//! The identifying [`InfoHash`] is computed over the canonically encoded
//! info section; key order is fixed by the codec, so parse/re-encode cycles
//! are hash-stable.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-47]: http://bittorrent.org/beps/bep_0047.html
//! [BEP-52]: http://bittorrent.org/beps/bep_0052.html

mod builder;
mod edit;
mod error;
mod file_tree;
mod info_hash;
mod torrent;

pub use builder::{ProgressFn, Torrent, TorrentBuilder};
pub use edit::{edit_torrent, FieldEdits};
pub use error::MetainfoError;
pub use file_tree::{FileTree, TreeFile};
pub use info_hash::InfoHash;
pub use torrent::{FileSpan, Info, Metainfo, ProtocolVersion};
