//! Botes: a paint can inventory
//!
//! Tracks cans by name and manufacturer code, derives a display color from
//! the code, and lists them with search, mix-state filtering and sorting.
//! Records live as plain YAML files (or a SQLite database) inside a project
//! directory.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
