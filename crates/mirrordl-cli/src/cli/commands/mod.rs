//! CLI command handlers, one file per command.

mod check;
mod checksum;
mod fetch;
mod probe;

pub use check::run_check;
pub use checksum::run_checksum;
pub use fetch::{run_fetch, FetchOptions};
pub use probe::run_probe;
