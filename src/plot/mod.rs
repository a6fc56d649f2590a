//! Chart output.
//!
//! - SVG trend grid, one panel per instrument (`chart`)

pub mod chart;

pub use chart::*;
