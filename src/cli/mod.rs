//! CLI components.

pub mod bridge;
pub mod runner;

pub use bridge::{decode_line, encode_line, StdioChannel};
pub use runner::{execute, run, Command};
