//! Markup extraction: find the share table, then parse its rows.
//!
//! - table selection (`table`)
//! - row-level parsing with skip reasons (`rows`)

pub mod rows;
pub mod table;

pub use rows::*;
pub use table::*;
