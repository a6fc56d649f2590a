//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the tracked instrument and its observations (`Instrument`, `DataPoint`)
//! - the collector's outputs (`Series`, `Dataset`)
//! - pipeline configuration (`PipelineConfig`, `WaitConfig`, `Engine`)

pub mod types;

pub use types::*;
