//! Cooperative cancellation for long-running hash operations.
//!
//! Hashing a multi-gigabyte payload can take minutes. A [`CancelToken`] is
//! handed to builders, verifiers, and the low-level hashers, which check it
//! at block boundaries and abort with a cancellation error when it trips.
//! The default token never cancels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable flag shared between a caller and an in-flight hash operation.
///
/// Cloning is cheap; all clones observe the same flag. Cancellation is
/// one-way and permanent for the lifetime of the token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token. Operations holding a clone stop at their next
    /// block boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear_and_trips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }
}
