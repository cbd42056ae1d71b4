//! CLI command handlers, one per file.

mod get;
mod send;

pub use get::run_get;
pub use send::run_send;
