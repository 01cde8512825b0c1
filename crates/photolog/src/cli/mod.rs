//! Command handlers for the `photolog` binary.

pub mod catalog;
pub mod config;
pub mod import;
pub mod serve;
