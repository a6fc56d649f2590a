//! Static HTML report page.
//!
//! The page is self-contained apart from the chart image, which is referenced by
//! file name so both can be published side by side.

use std::fs;
use std::path::Path;

use crate::error::{AppError, EXIT_OUTPUT};
use crate::report::{RankEntry, ReportContext, format_thousands};

/// Entries at or above this rank are highlighted.
const HIGHLIGHT_TOP: usize = 3;

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f4f4f4; }
        h1 { text-align: center; color: #333; }
        .update-time { text-align: center; color: #666; margin-bottom: 20px; }
        .chart-box { width: 100%; text-align: center; background: white; padding: 10px; box-shadow: 0 0 10px rgba(0,0,0,0.1); margin-bottom: 20px; }
        .rank-box { width: 100%; background: white; padding: 20px; box-shadow: 0 0 10px rgba(0,0,0,0.1); margin-bottom: 20px; }
        .rank-list { column-count: 3; column-gap: 40px; list-style-type: none; padding: 0; }
        .rank-list li { padding: 5px 0; border-bottom: 1px solid #eee; }
        .rank-list li.top { color: red; font-weight: bold; }
        img { max-width: 100%; height: auto; }
        @media (max-width: 768px) { .rank-list { column-count: 1; } }
"#;

/// Render the report page. `chart_file` is the image's path relative to the page.
pub fn render_report_html(entries: &[RankEntry], ctx: ReportContext, chart_file: Option<&str>) -> String {
    let mut items = String::new();
    for e in entries {
        let class = if e.rank <= HIGHLIGHT_TOP { " class=\"top\"" } else { "" };
        items.push_str(&format!(
            "            <li{class}>{}. {} ({}): {} 万份</li>\n",
            e.rank,
            escape(&e.instrument.display_name),
            escape(&e.instrument.id),
            format_thousands(e.latest.value),
        ));
    }

    let chart = match chart_file {
        Some(file) => format!(
            "    <div class=\"chart-box\">\n        <img src=\"{}\" alt=\"ETF share trends\">\n    </div>\n",
            escape(file)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ETF 份额日报</title>
    <style>{STYLE}    </style>
</head>
<body>
    <h1>ETF 场内份额每日追踪</h1>
    <div class="update-time">更新时间 (北京时间): {time} · 窗口 {window} 个交易日</div>

    <div class="rank-box">
        <h3>最新份额排名</h3>
        <ul class="rank-list">
{items}        </ul>
    </div>

{chart}</body>
</html>
"#,
        time = ctx.generated_at.format("%Y-%m-%d %H:%M:%S"),
        window = ctx.window_size,
    )
}

/// Render and write the report page.
pub fn write_report_html(
    path: &Path,
    entries: &[RankEntry],
    ctx: ReportContext,
    chart_file: Option<&str>,
) -> Result<(), AppError> {
    let html = render_report_html(entries, ctx, chart_file);
    fs::write(path, html)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write report '{}': {e}", path.display())))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
