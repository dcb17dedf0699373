use std::fmt;

/// The identifying hash of a torrent's canonically encoded info section.
///
/// v1 torrents use SHA1 (20 bytes), v2 torrents SHA256 (32 bytes), and
/// hybrid torrents carry both so they can join either swarm.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoHash {
    V1([u8; 20]),
    V2([u8; 32]),
    Hybrid { v1: [u8; 20], v2: [u8; 32] },
}

impl InfoHash {
    /// Returns the SHA1 hash, when this torrent has a v1 identity.
    pub fn v1(&self) -> Option<[u8; 20]> {
        match self {
            InfoHash::V1(h) => Some(*h),
            InfoHash::Hybrid { v1, .. } => Some(*v1),
            InfoHash::V2(_) => None,
        }
    }

    /// Returns the SHA256 hash, when this torrent has a v2 identity.
    pub fn v2(&self) -> Option<[u8; 32]> {
        match self {
            InfoHash::V2(h) => Some(*h),
            InfoHash::Hybrid { v2, .. } => Some(*v2),
            InfoHash::V1(_) => None,
        }
    }

    /// Hex form of the primary hash (v1 when present, v2 otherwise).
    pub fn to_hex(&self) -> String {
        match self {
            InfoHash::V1(h) => hex_encode(h),
            InfoHash::Hybrid { v1, .. } => hex_encode(v1),
            InfoHash::V2(h) => hex_encode(h),
        }
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        },
    )
}
