//! Entity type definitions
//!
//! - [`PaintCan`] - one can of paint in the inventory, with its store id
//! - [`Paint`] - the record content shared by new and replaced cans

pub mod paint;

pub use paint::{check_percent, MixState, Paint, PaintCan, RecordError};
