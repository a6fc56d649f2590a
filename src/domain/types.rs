//! Shared domain types.
//!
//! These are deliberately plain values: the collector produces them, the ranking,
//! chart and report stages only read them.

use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One tracked exchange-traded fund.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub display_name: String,
}

impl Instrument {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// `"{id} {name}"`, the label used in chart titles and log lines.
    pub fn label(&self) -> String {
        format!("{} {}", self.id, self.display_name)
    }
}

/// One observation of outstanding on-exchange shares, in units of 10,000 shares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A canonical series: ascending, one point per date, windowed.
///
/// Only the series assembler constructs these, so every `Series` in a `Dataset`
/// already satisfies the ordering, uniqueness and length invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    instrument: Instrument,
    points: Vec<DataPoint>,
}

impl Series {
    pub(crate) fn from_assembled(instrument: Instrument, points: Vec<DataPoint>) -> Self {
        Self { instrument, points }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point. Assembled series are never empty, but callers still get an `Option`.
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn earliest(&self) -> Option<&DataPoint> {
        self.points.first()
    }
}

/// Successful series keyed by instrument id, in the order they were collected.
///
/// Consumers should not rely on that order; ranking sorts explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    series: Vec<Series>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series, replacing any earlier series for the same instrument id.
    pub fn insert(&mut self, series: Series) {
        match self
            .series
            .iter_mut()
            .find(|s| s.instrument.id == series.instrument.id)
        {
            Some(slot) => *slot = series,
            None => self.series.push(series),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.instrument.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.instrument.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Which browsing engine backs the render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// Headless Chromium: executes the page's scripts and can open the history tab.
    Chrome,
    /// Plain HTTP GET: only sees server-rendered markup.
    Http,
}

/// Bounded waits used by the render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Upper bound for the page to show the share table or history tab after navigation.
    pub settle_timeout: Duration,
    /// Upper bound for the history tab to become clickable, and for its table to appear.
    pub tab_timeout: Duration,
    /// Delay between readiness probes.
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            settle_timeout: Duration::from_secs(10),
            tab_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Everything the collection pipeline needs, independent of how it was configured.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum number of most-recent points kept per series (also caps rows read).
    pub window_size: usize,
    /// A series must have strictly more points than this to be kept.
    pub min_points: usize,
    /// Substring identifying the share-history table among the page's tables.
    pub table_marker: String,
    pub waits: WaitConfig,
}

pub const DEFAULT_WINDOW_SIZE: usize = 180;
pub const DEFAULT_MIN_POINTS: usize = 5;
pub const DEFAULT_TABLE_MARKER: &str = "场内份额";

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_points: DEFAULT_MIN_POINTS,
            table_marker: DEFAULT_TABLE_MARKER.to_string(),
            waits: WaitConfig::default(),
        }
    }
}
