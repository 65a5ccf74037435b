//! CLI command implementations.
//!
//! Each module exposes a single `run` function wired up in `main.rs`.

pub mod clean;
pub mod setup;
