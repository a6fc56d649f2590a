//! Terminal output: the ranking table and run summary.

use crate::app::pipeline::BatchReport;
use crate::report::{RankEntry, ReportContext};

/// Format the ranking as a fixed-width table.
///
/// Display names go last: CJK characters take two terminal columns, so padding them
/// by `char` count would skew every column after the name.
pub fn format_rankings(entries: &[RankEntry], ctx: ReportContext) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "ETF on-exchange shares ({}; window {} days; shares in 10k)\n",
        ctx.generated_at.format("%Y-%m-%d %H:%M"),
        ctx.window_size
    ));

    out.push_str(&format!(
        "{:>4} {:<8} {:<10} {:>14} {:>14} {:>9} {}\n",
        "rank", "code", "date", "shares", "change", "change%", "name"
    ));
    out.push_str(&format!(
        "{:-<4} {:-<8} {:-<10} {:-<14} {:-<14} {:-<9} {:-<4}\n",
        "", "", "", "", "", "", ""
    ));

    for e in entries {
        let pct = e
            .change_pct()
            .map(|p| format!("{p:+.1}%"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>4} {:<8} {:<10} {:>14} {:>14} {:>9} {}\n",
            e.rank,
            e.instrument.id,
            e.latest.date,
            format_thousands(e.latest.value),
            format_signed_thousands(e.change()),
            pct,
            e.instrument.display_name,
        ));
    }

    out
}

/// One line per skipped instrument, for the end-of-run summary.
pub fn format_failures(report: &BatchReport) -> String {
    let mut out = String::new();
    for (instrument, err) in &report.failures {
        out.push_str(&format!("skipped {}: {err}\n", instrument.label()));
    }
    out
}

/// `1234567.4` -> `"1,234,567"`.
pub fn format_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_signed_thousands(v: f64) -> String {
    if v.round() > 0.0 {
        format!("+{}", format_thousands(v))
    } else {
        format_thousands(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;
    use crate::error::FetchError;
    use crate::report::rank_by_latest;
    use crate::report::tests::dataset;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1234.0), "1,234");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(-45678.0), "-45,678");
        assert_eq!(format_signed_thousands(1500.0), "+1,500");
        assert_eq!(format_signed_thousands(-0.2), "0");
    }

    #[test]
    fn rankings_table_lists_entries_in_rank_order() {
        let ds = dataset(&[
            ("512880", "证券ETF", &[100.0, 100.0, 100.0, 100.0, 100.0, 2500.0]),
            ("512800", "银行ETF", &[50.0, 50.0, 50.0, 50.0, 50.0, 12000.0]),
        ]);
        let ranked = rank_by_latest(&ds);
        let text = format_rankings(&ranked, crate::report::ReportContext::now(180));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].contains("512800"));
        assert!(lines[3].contains("12,000"));
        assert!(lines[4].contains("512880"));
        assert!(lines[4].contains("+2,400"));
        assert!(lines.iter().all(|l| l == &l.trim_end()));
    }

    #[test]
    fn columns_before_the_name_line_up_for_wide_names() {
        let ds = dataset(&[
            ("510300", "沪深300ETF", &[1.0, 1.0, 1.0, 1.0, 1.0, 400_000.0]),
            ("588000", "科创50ETF", &[1.0, 1.0, 1.0, 1.0, 1.0, 3_000.0]),
        ]);
        let ranked = rank_by_latest(&ds);
        let text = format_rankings(&ranked, crate::report::ReportContext::now(180));
        let lines: Vec<&str> = text.lines().skip(1).collect();

        // Everything up to the name column is ASCII, so byte offsets are column offsets.
        let name_col = lines[0].find("name").unwrap();
        assert!(lines[0][..name_col].is_ascii());
        assert!(lines[2][..name_col].is_ascii());
        assert!(lines[3][..name_col].is_ascii());
        assert_eq!(&lines[2][name_col..], "沪深300ETF");
        assert_eq!(&lines[3][name_col..], "科创50ETF");
    }

    #[test]
    fn failures_are_listed_with_reason() {
        let report = BatchReport {
            failures: vec![(
                Instrument::new("159745", "建材ETF"),
                FetchError::InsufficientData { points: 3, min_points: 5 },
            )],
            attempted: 1,
            ..BatchReport::default()
        };
        assert_eq!(
            format_failures(&report),
            "skipped 159745 建材ETF: only 3 usable points, need more than 5\n"
        );
    }
}
