//! Canonical bencode codec ([BEP-3]).
//!
//! Bencode is the wire format for torrent metainfo documents. Four shapes
//! exist: integers (`i42e`), byte strings (`4:spam`), lists (`l...e`), and
//! dictionaries (`d...e`). The encoding here is canonical: dictionaries
//! always serialize with keys in sorted byte order, so re-encoding a decoded
//! document reproduces the exact bytes its info hash was computed from.
//!
//! Decoding is strict and total: truncated prefixes, unterminated
//! containers, and unknown leading bytes are fatal errors with no partial
//! result. Byte strings that are not valid UTF-8 (piece hashes, merkle
//! roots) are preserved as raw bytes.
//!
//! ```
//! use torrentkit::bencode::{decode, encode, Value};
//!
//! let value = decode(b"d3:numi7e4:word4:spame").unwrap();
//! assert_eq!(value.get(b"num").and_then(|v| v.as_integer()), Some(7));
//! assert_eq!(encode(&value), b"d3:numi7e4:word4:spame");
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_prefix};
pub use encode::{encode, encode_into};
pub use error::BencodeError;
pub use value::Value;

#[cfg(test)]
mod tests;
