//! `etf-shares` library crate.
//!
//! The binary (`etf-shares`) is a thin wrapper around this library so that:
//!
//! - the collection pipeline is testable without a browser or network
//! - render engines can be swapped behind the `RenderSession` trait
//! - chart/report stages only ever see the finished `Dataset`

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod extract;
pub mod io;
pub mod logging;
pub mod plot;
pub mod registry;
pub mod render;
pub mod report;
pub mod series;
