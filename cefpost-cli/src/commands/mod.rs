//! Subcommand handlers
//!
//! Each handler receives its parsed arguments and an [`OutputWriter`](crate::output::OutputWriter)
//! and never prints directly.

pub mod config;
pub mod parse;
