//! Input/output helpers.
//!
//! - dataset exports (JSON/CSV) (`export`)

pub mod export;

pub use export::*;
