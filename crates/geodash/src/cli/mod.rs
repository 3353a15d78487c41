//! Command implementations for the `geodash` binary.

pub mod config;
pub mod preview;
pub mod serve;
pub mod stats;
