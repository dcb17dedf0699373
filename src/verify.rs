//! Streaming content verification against a metainfo document.
//!
//! The [`Checker`] re-derives piece hashes from files on disk and compares
//! them with the hashes a `.torrent` document stores, reporting how much of
//! the declared content is present and intact:
//!
//! 1. **Load** - decode the document and detect the wire variant.
//! 2. **LocateRoot** - resolve the supplied path to the declared name,
//!    searching immediate children when the base name differs.
//! 3. **Enumerate** - collect the expected files (flat list for v1, file
//!    tree walk for v2/hybrid).
//! 4. **StreamCompare** - hash content with the same engine the builder
//!    used; absent and truncated files read as zeros and simply fail their
//!    pieces.
//! 5. **Report** - aggregate per-piece outcomes into an integer-truncated
//!    match percentage; 100 means every piece matched.
//!
//! ```no_run
//! use torrentkit::verify::Checker;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = Checker::new("payload.torrent", "downloads/")?.check()?;
//! println!("{}% intact", report.percent());
//! # Ok(())
//! # }
//! ```

mod checker;
mod error;
mod report;

pub use checker::{Checker, ProgressFn};
pub use error::VerifyError;
pub use report::{PieceOutcome, Report};
