//! Mirror probing and selection.
//!
//! Each configured mirror gets a small ranged read; the mirror that moved
//! bytes fastest serves the real transfer. When no mirror answers, a
//! designated fallback is used so there is always a target.

mod candidate;
mod probe;
mod select;

pub use candidate::{join_url, MirrorCandidate};
pub use probe::{probe, ProbeResult};
pub use select::{rank, select, Selection};
