//! Shared "collect" pipeline.
//!
//! Per instrument, in registry order:
//! render snapshot -> locate share table -> parse rows -> assemble series
//!
//! Each instrument is one unit of failure. Whatever goes wrong for one (navigation,
//! missing table, too few rows) is logged and the batch moves on; only an empty
//! dataset at the end fails the run.

use scraper::Html;
use tracing::{debug, info, warn};

use crate::domain::{DataPoint, Dataset, Instrument, PipelineConfig, Series};
use crate::error::{AppError, EmptyDatasetError, FetchError};
use crate::extract::{RowOutcome, locate_table, parse_table};
use crate::render::{self, RawSnapshot, RenderSession, SessionOptions};
use crate::series;

/// Result of one instrument's fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Series),
    Failure(FetchError),
}

/// Everything a batch produced: the dataset plus who was skipped and why.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub dataset: Dataset,
    pub failures: Vec<(Instrument, FetchError)>,
    pub attempted: usize,
}

impl BatchReport {
    /// The dataset, or an error if no instrument produced a series.
    pub fn into_dataset(self) -> Result<Dataset, EmptyDatasetError> {
        if self.dataset.is_empty() {
            return Err(EmptyDatasetError {
                attempted: self.attempted,
            });
        }
        Ok(self.dataset)
    }
}

/// Open a session, collect every instrument, and tear the session down.
///
/// The session is dropped before this returns on every path, so the browser never
/// outlives the batch. Only a session that cannot be started is an error here;
/// see `BatchReport::into_dataset` for the empty-run check.
pub fn collect(
    instruments: &[Instrument],
    options: &SessionOptions,
    config: &PipelineConfig,
) -> Result<BatchReport, AppError> {
    let mut session = render::open(options, config)?;
    let report = run_batch(instruments, session.as_mut(), config);
    drop(session);

    info!(
        collected = report.dataset.len(),
        skipped = report.failures.len(),
        attempted = report.attempted,
        "batch finished"
    );
    Ok(report)
}

/// Run every instrument through `session`, one at a time.
pub fn run_batch(
    instruments: &[Instrument],
    session: &mut dyn RenderSession,
    config: &PipelineConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    let total = instruments.len();

    for (i, instrument) in instruments.iter().enumerate() {
        info!(
            code = %instrument.id,
            name = %instrument.display_name,
            "[{}/{}] fetching",
            i + 1,
            total
        );
        report.attempted += 1;

        match fetch_instrument(session, instrument, config) {
            FetchOutcome::Success(series) => {
                debug!(code = %instrument.id, points = series.len(), "series assembled");
                report.dataset.insert(series);
            }
            FetchOutcome::Failure(err) => {
                warn!(code = %instrument.id, error = %err, "skipping instrument");
                report.failures.push((instrument.clone(), err));
            }
        }
    }

    report
}

/// Fetch and assemble one instrument. Never panics on bad pages; every failure is an outcome.
pub fn fetch_instrument(
    session: &mut dyn RenderSession,
    instrument: &Instrument,
    config: &PipelineConfig,
) -> FetchOutcome {
    match try_fetch(session, instrument, config) {
        Ok(series) => FetchOutcome::Success(series),
        Err(err) => FetchOutcome::Failure(err),
    }
}

fn try_fetch(
    session: &mut dyn RenderSession,
    instrument: &Instrument,
    config: &PipelineConfig,
) -> Result<Series, FetchError> {
    let snapshot = session.snapshot(instrument)?;
    debug!(
        code = %instrument.id,
        captured_at = %snapshot.captured_at.format("%H:%M:%S%.3f"),
        history_view = snapshot.history_view,
        bytes = snapshot.html.len(),
        "snapshot captured"
    );
    if !snapshot.history_view {
        debug!(code = %instrument.id, "history view not active; parsing current page");
    }
    let points = points_from_snapshot(&snapshot, config)?;
    series::assemble(instrument, points, config)
}

/// Locate the share table in a snapshot and parse its rows.
pub fn points_from_snapshot(snapshot: &RawSnapshot, config: &PipelineConfig) -> Result<Vec<DataPoint>, FetchError> {
    let doc = Html::parse_document(&snapshot.html);
    let table = locate_table(&doc, &config.table_marker)?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for outcome in parse_table(table, config.window_size) {
        match outcome {
            RowOutcome::Parsed(point) => points.push(point),
            RowOutcome::Skipped(reason) => {
                skipped += 1;
                debug!(code = %snapshot.instrument_id, %reason, "row skipped");
            }
        }
    }
    debug!(
        code = %snapshot.instrument_id,
        parsed = points.len(),
        skipped,
        "table parsed"
    );
    Ok(points)
}
