use super::error::HasherError;

/// Smallest accepted piece length (16 KiB, one merkle block).
pub const MIN_PIECE_LENGTH: u64 = 1 << 14;

/// Largest accepted piece length (8 MiB).
pub const MAX_PIECE_LENGTH: u64 = 1 << 23;

/// Picks a piece length for content of the given total size.
///
/// Doubles from 16 KiB until the piece count drops to a reasonable figure or
/// the 8 MiB cap is reached. The result is always a power of two within
/// [`MIN_PIECE_LENGTH`, `MAX_PIECE_LENGTH`] and never decreases as the size
/// grows.
pub fn piece_length_for(total_size: u64) -> u64 {
    let mut exp = 14u32;
    while (total_size >> exp) > 2048 && exp < 23 {
        exp += 1;
    }
    1u64 << exp
}

/// Validates a caller-supplied piece length.
///
/// Accepts either an exact byte count (a power of two in range) or the
/// exponent shorthand `14..=23` meaning `2^n` bytes. Anything else is a
/// [`HasherError::PieceLength`].
pub fn normalize_piece_length(requested: u64) -> Result<u64, HasherError> {
    if (14..=23).contains(&requested) {
        return Ok(1u64 << requested);
    }
    if requested.is_power_of_two()
        && (MIN_PIECE_LENGTH..=MAX_PIECE_LENGTH).contains(&requested)
    {
        return Ok(requested);
    }
    Err(HasherError::PieceLength(requested))
}
