//! End-to-end collection runs against a scripted render session.

use std::collections::HashMap;

use chrono::NaiveDate;
use etf_shares::app::pipeline::{FetchOutcome, fetch_instrument, run_batch};
use etf_shares::domain::{Instrument, PipelineConfig};
use etf_shares::error::{FetchError, RenderError};
use etf_shares::render::{RawSnapshot, RenderSession};
use etf_shares::report::rank_by_latest;

/// What the scripted session does for one instrument.
enum Script {
    Page(String),
    Fail,
}

struct ScriptedSession {
    scripts: HashMap<String, Script>,
    visited: Vec<String>,
}

impl ScriptedSession {
    fn new(scripts: impl IntoIterator<Item = (&'static str, Script)>) -> Self {
        Self {
            scripts: scripts.into_iter().map(|(id, s)| (id.to_string(), s)).collect(),
            visited: Vec::new(),
        }
    }
}

impl RenderSession for ScriptedSession {
    fn snapshot(&mut self, instrument: &Instrument) -> Result<RawSnapshot, RenderError> {
        self.visited.push(instrument.id.clone());
        match self.scripts.get(&instrument.id) {
            Some(Script::Page(html)) => Ok(RawSnapshot::new(instrument.id.clone(), html.clone(), true)),
            Some(Script::Fail) | None => Err(RenderError::Navigate {
                url: etf_shares::registry::detail_url(&instrument.id),
                reason: "net::ERR_TIMED_OUT".to_string(),
            }),
        }
    }

    fn engine_name(&self) -> &'static str {
        "scripted"
    }
}

/// A detail page with a quote table first, then the share history table, newest row first.
fn detail_page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from(
        r#"<html><body>
        <table class="quote"><tr><td>最新价</td><td>1.001</td></tr></table>
        <table class="history">
          <thead><tr><th>日期</th><th>收盘价</th><th>净值</th><th>溢价率</th><th>规模(亿)</th><th>场内份额</th><th>份额变化</th></tr></thead>
          <tbody>"#,
    );
    for (date, shares) in rows {
        html.push_str(&format!(
            "<tr><td>{date}</td><td>1.0</td><td>1.0</td><td>0.01%</td><td>12.34</td><td>{shares}</td><td>0</td></tr>"
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn mixed_batch_keeps_only_the_dense_series() {
    let no_table = "<html><body><table><tr><td>基金概况</td></tr></table></body></html>".to_string();
    let sparse = detail_page(&[
        ("2024/06/03 一", "1,000万"),
        ("2024/06/04 二", "1,010万"),
        ("2024/06/05 三", "1,020万"),
    ]);
    let dense = detail_page(&[
        ("2024/06/14", "2,080万"),
        ("2024/06/13", "2,070万"),
        ("2024/06/12", "2,060万"),
        ("2024/06/11", "2,050万"),
        ("2024/06/11", "2,050万"),
        ("2024/06/07", "2,040万"),
        ("2024/06/06", "2,030万"),
        ("2024/06/05", "2,020万"),
        ("2024/06/04", "2,010万"),
        ("2024/06/04", "2,010万"),
    ]);

    let instruments = vec![
        Instrument::new("516970", "基建50ETF"),
        Instrument::new("159745", "建材ETF"),
        Instrument::new("515210", "钢铁ETF"),
    ];
    let mut session = ScriptedSession::new([
        ("516970", Script::Page(no_table)),
        ("159745", Script::Page(sparse)),
        ("515210", Script::Page(dense)),
    ]);

    let report = run_batch(&instruments, &mut session, &PipelineConfig::default());

    assert_eq!(session.visited, vec!["516970", "159745", "515210"]);
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(report.failures[0].1, FetchError::TableNotFound { .. }));
    assert!(matches!(
        report.failures[1].1,
        FetchError::InsufficientData { points: 3, min_points: 5 }
    ));

    let dataset = report.into_dataset().unwrap();
    assert_eq!(dataset.len(), 1);
    let series = dataset.get("515210").unwrap();
    assert_eq!(series.len(), 8);
    assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(series.earliest().unwrap().date, ymd(2024, 6, 4));
    assert_eq!(series.latest().unwrap().date, ymd(2024, 6, 14));
    assert_eq!(series.latest().unwrap().value, 2080.0);
}

#[test]
fn render_failure_is_isolated() {
    let instruments = vec![Instrument::new("A", "fails"), Instrument::new("B", "works")];
    let rows: Vec<(String, String)> = (1..=6)
        .map(|d| (format!("2024/07/{d:02}"), format!("{}万", d * 100)))
        .collect();
    let rows: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let mut session = ScriptedSession::new([("A", Script::Fail), ("B", Script::Page(detail_page(&rows)))]);

    let report = run_batch(&instruments, &mut session, &PipelineConfig::default());
    assert!(matches!(report.failures[0].1, FetchError::Render(RenderError::Navigate { .. })));

    let dataset = report.into_dataset().unwrap();
    let ranked = rank_by_latest(&dataset);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].instrument.id, "B");
    assert_eq!(ranked[0].latest.value, 600.0);
}

#[test]
fn window_bounds_rows_read_and_points_kept() {
    let rows: Vec<(String, String)> = (0..30)
        .map(|i| {
            let date = ymd(2024, 1, 1) + chrono::Days::new(i);
            (date.format("%Y/%m/%d").to_string(), format!("{}万", i))
        })
        .collect();
    let rows: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let mut session = ScriptedSession::new([("C", Script::Page(detail_page(&rows)))]);
    let config = PipelineConfig {
        window_size: 10,
        ..PipelineConfig::default()
    };

    let FetchOutcome::Success(series) = fetch_instrument(&mut session, &Instrument::new("C", "c"), &config) else {
        panic!("expected a series");
    };
    // Only the first 10 data rows are read; they are the oldest here, and all are kept.
    assert_eq!(series.len(), 10);
    assert_eq!(series.earliest().unwrap().date, ymd(2024, 1, 1));
    assert_eq!(series.latest().unwrap().date, ymd(2024, 1, 10));
}

#[test]
fn empty_run_is_an_error() {
    let instruments = vec![Instrument::new("A", "a"), Instrument::new("B", "b")];
    let mut session = ScriptedSession::new([("A", Script::Fail), ("B", Script::Fail)]);
    let report = run_batch(&instruments, &mut session, &PipelineConfig::default());
    let err = report.into_dataset().unwrap_err();
    assert_eq!(err.attempted, 2);
}
