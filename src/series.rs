//! Series assembly: parsed points -> canonical series.
//!
//! Steps, in order:
//! 1. sort ascending by date (stable, so page order breaks ties)
//! 2. collapse repeated dates, keeping the first occurrence
//! 3. keep the most recent `window_size` points
//! 4. reject the result unless it has more than `min_points` points

use crate::domain::{DataPoint, Instrument, PipelineConfig, Series};
use crate::error::FetchError;

pub fn assemble(
    instrument: &Instrument,
    points: Vec<DataPoint>,
    config: &PipelineConfig,
) -> Result<Series, FetchError> {
    let points = canonical_points(points, config.window_size);
    if points.len() <= config.min_points {
        return Err(FetchError::InsufficientData {
            points: points.len(),
            min_points: config.min_points,
        });
    }
    Ok(Series::from_assembled(instrument.clone(), points))
}

/// Sorted, one point per date, at most `window_size` long.
///
/// Exact duplicates always collapse. If the page lists one date twice with different
/// values, the row that appeared first is kept.
pub fn canonical_points(mut points: Vec<DataPoint>, window_size: usize) -> Vec<DataPoint> {
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    if points.len() > window_size {
        points.drain(..points.len() - window_size);
    }
    points
}
