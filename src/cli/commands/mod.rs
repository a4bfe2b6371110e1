//! CLI command implementations

pub mod utils;

pub mod color;
pub mod completions;
pub mod config;
pub mod init;
pub mod paint;
