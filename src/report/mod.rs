//! Ranking and report outputs.
//!
//! - ranking by latest share count (this module)
//! - terminal table (`format`)
//! - static HTML page (`html`)

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::domain::{DataPoint, Dataset, Instrument};

pub mod format;
pub mod html;

pub use format::*;
pub use html::*;

/// Report timestamps are shown in Beijing time.
const BEIJING_OFFSET_SECS: i32 = 8 * 3600;

/// Per-run values every output stage needs. Produced once, passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub generated_at: DateTime<FixedOffset>,
    pub window_size: usize,
}

impl ReportContext {
    pub fn now(window_size: usize) -> Self {
        let offset = FixedOffset::east_opt(BEIJING_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Self {
            generated_at: Utc::now().with_timezone(&offset),
            window_size,
        }
    }
}

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    /// 1-based.
    pub rank: usize,
    pub instrument: Instrument,
    pub latest: DataPoint,
    /// Oldest point in the window, for the change column.
    pub first: DataPoint,
}

impl RankEntry {
    pub fn change(&self) -> f64 {
        self.latest.value - self.first.value
    }

    /// Relative change over the window; `None` when the window starts at zero.
    pub fn change_pct(&self) -> Option<f64> {
        (self.first.value > 0.0).then(|| self.change() / self.first.value * 100.0)
    }
}

/// Rank instruments by their latest share count, largest first. Ties go to the lower code.
pub fn rank_by_latest(dataset: &Dataset) -> Vec<RankEntry> {
    let mut entries: Vec<(Instrument, DataPoint, DataPoint)> = dataset
        .iter()
        .filter_map(|s| Some((s.instrument().clone(), *s.latest()?, *s.earliest()?)))
        .collect();

    entries.sort_by(|a, b| {
        b.1.value
            .partial_cmp(&a.1.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (instrument, latest, first))| RankEntry {
            rank: i + 1,
            instrument,
            latest,
            first,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::domain::PipelineConfig;
    use crate::series::assemble;

    pub(crate) fn dataset(entries: &[(&str, &str, &[f64])]) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut ds = Dataset::new();
        for (id, name, values) in entries {
            let points = values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint::new(start + Days::new(i as u64), *v))
                .collect();
            let series = assemble(&Instrument::new(*id, *name), points, &PipelineConfig::default()).unwrap();
            ds.insert(series);
        }
        ds
    }

    #[test]
    fn ranks_by_latest_value_descending() {
        let ds = dataset(&[
            ("159995", "芯片ETF", &[1.0, 2.0, 3.0, 4.0, 5.0, 600.0]),
            ("510300", "沪深300ETF", &[900.0, 900.0, 900.0, 900.0, 900.0, 800.0]),
            ("512880", "证券ETF", &[10.0, 10.0, 10.0, 10.0, 10.0, 700.0]),
        ]);
        let ranked = rank_by_latest(&ds);
        let ids: Vec<&str> = ranked.iter().map(|e| e.instrument.id.as_str()).collect();
        assert_eq!(ids, vec!["510300", "512880", "159995"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].change(), -100.0);
        assert_eq!(ranked[2].change_pct(), Some(59900.0));
    }

    #[test]
    fn ties_break_by_code() {
        let ds = dataset(&[
            ("588000", "科创50ETF", &[1.0; 6]),
            ("159949", "创业板50ETF", &[1.0; 6]),
        ]);
        let ranked = rank_by_latest(&ds);
        assert_eq!(ranked[0].instrument.id, "159949");
    }

    #[test]
    fn context_uses_beijing_offset() {
        let ctx = ReportContext::now(180);
        assert_eq!(ctx.generated_at.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(ctx.window_size, 180);
    }
}
