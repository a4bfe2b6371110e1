//! Core module - fundamental types and utilities

pub mod color;
pub mod config;
pub mod identity;
pub mod project;
pub mod query;
pub mod shortid;
pub mod store;

pub use color::{ColorError, ColorHex, ColorMode, ColorResolver};
pub use config::{Config, ConfigError};
pub use identity::{IdParseError, RecordId};
pub use project::{Project, ProjectError};
pub use query::{MixFilter, Query, SortKey};
pub use shortid::ShortIdIndex;
pub use store::{open_store, MemoryStore, RecordStore, StoreBackend, StoreError};
