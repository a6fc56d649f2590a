//! Plotters-powered trend grid, rendered to SVG.
//!
//! One small line chart per instrument, laid out row-major in a fixed grid. All styling
//! lives in `ChartConfig`, which the caller builds once per report and passes in; there
//! is no global plotting state.

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::Days;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::warn;

use crate::domain::Series;
use crate::error::{AppError, EXIT_OUTPUT};
use crate::report::ReportContext;

const FALLBACK_FONT: &str = "sans-serif";

/// Rendering settings for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Font family name written into the SVG.
    pub font_family: String,
    pub columns: usize,
    pub max_rows: usize,
    /// Size of one panel in pixels.
    pub panel_size: (u32, u32),
    /// Height reserved for the overall caption.
    pub caption_height: u32,
    pub line_color: RGBColor,
    pub annotation_color: RGBColor,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_family: FALLBACK_FONT.to_string(),
            columns: 3,
            max_rows: 8,
            panel_size: (660, 480),
            caption_height: 90,
            line_color: RGBColor(0, 102, 204),
            annotation_color: RGBColor(220, 0, 0),
        }
    }
}

impl ChartConfig {
    /// Use the family named by `font_file` (e.g. `SimHei.ttf` -> `SimHei`) if the file exists.
    ///
    /// CJK titles need a CJK-capable font; without one viewers may show boxes.
    pub fn with_font_file(mut self, font_file: &Path) -> Self {
        let family = font_file
            .is_file()
            .then(|| font_file.file_stem().and_then(|s| s.to_str()))
            .flatten();
        match family {
            Some(name) => self.font_family = name.to_string(),
            None => {
                warn!(
                    font = %font_file.display(),
                    "font file not found; using {FALLBACK_FONT}, CJK text may not render"
                );
                self.font_family = FALLBACK_FONT.to_string();
            }
        }
        self
    }

    pub fn capacity(&self) -> usize {
        self.columns * self.max_rows
    }

    fn canvas_size(&self, panels: usize) -> (u32, u32) {
        let rows = panels.div_ceil(self.columns.max(1)).clamp(1, self.max_rows.max(1));
        (
            self.panel_size.0 * self.columns as u32,
            self.caption_height + self.panel_size.1 * rows as u32,
        )
    }
}

/// Render the trend grid as an SVG document.
///
/// Series beyond the grid's capacity are left out (and logged).
pub fn render_chart_svg(series: &[&Series], ctx: ReportContext, config: &ChartConfig) -> Result<String, AppError> {
    let shown = &series[..series.len().min(config.capacity())];
    if shown.len() < series.len() {
        warn!(
            shown = shown.len(),
            total = series.len(),
            "chart grid is full; remaining instruments left out"
        );
    }

    let mut svg = String::new();
    {
        let backend = SVGBackend::with_string(&mut svg, config.canvas_size(shown.len()));
        draw_grid(backend.into_drawing_area(), shown, ctx, config)
            .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to draw chart: {e}")))?;
    }
    Ok(svg)
}

/// Render and write the trend grid.
pub fn write_chart_svg(
    path: &Path,
    series: &[&Series],
    ctx: ReportContext,
    config: &ChartConfig,
) -> Result<(), AppError> {
    let svg = render_chart_svg(series, ctx, config)?;
    fs::write(path, svg)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write chart '{}': {e}", path.display())))
}

fn draw_grid(
    root: DrawingArea<SVGBackend<'_>, Shift>,
    series: &[&Series],
    ctx: ReportContext,
    config: &ChartConfig,
) -> Result<(), Box<dyn Error>> {
    root.fill(&WHITE)?;

    let caption = format!(
        "ETF场内份额趋势追踪 (更新时间: {})",
        ctx.generated_at.format("%Y-%m-%d %H:%M")
    );
    let (top, grid) = root.split_vertically(config.caption_height);
    top.titled(
        &caption,
        (config.font_family.as_str(), 40).into_font().style(FontStyle::Bold),
    )?;

    let rows = series.len().div_ceil(config.columns.max(1)).max(1);
    let panels = grid.split_evenly((rows, config.columns.max(1)));
    for (s, panel) in series.iter().zip(panels.iter()) {
        draw_panel(panel, s, config)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &Series,
    config: &ChartConfig,
) -> Result<(), Box<dyn Error>> {
    let (Some(first), Some(latest)) = (series.earliest(), series.latest()) else {
        return Ok(());
    };
    let origin = first.date;
    let xy: Vec<(f64, f64)> = series
        .points()
        .iter()
        .map(|p| ((p.date - origin).num_days() as f64, p.value))
        .collect();

    let x_max = xy.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
    let (y_min, y_max) = value_bounds(&xy);

    let font = config.font_family.as_str();
    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .caption(series.instrument().label(), (font, 22).into_font().style(FontStyle::Bold))
        .x_label_area_size(36)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    let fmt_x = |x: &f64| {
        (origin + Days::new(x.round().max(0.0) as u64))
            .format("%m-%d")
            .to_string()
    };
    let fmt_y = |y: &f64| format!("{y:.0}");
    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&fmt_y)
        .label_style((font, 13).into_font())
        .bold_line_style(&RGBColor(220, 220, 220))
        .light_line_style(&RGBColor(245, 245, 245))
        .draw()?;

    chart.draw_series(LineSeries::new(xy.iter().copied(), config.line_color.stroke_width(2)))?;
    chart.draw_series(
        xy.iter()
            .map(|&(x, y)| Circle::new((x, y), 3, config.line_color.filled())),
    )?;

    let last = (xy.last().map(|(x, _)| *x).unwrap_or(0.0), latest.value);
    let label_style = (font, 15)
        .into_font()
        .style(FontStyle::Bold)
        .color(&config.annotation_color);
    chart.draw_series(std::iter::once(
        EmptyElement::at(last) + Text::new(format!("{:.0}", latest.value), (-40, -22), label_style),
    ))?;

    Ok(())
}

/// Value range padded by 5%, never degenerate.
fn value_bounds(xy: &[(f64, f64)]) -> (f64, f64) {
    let (lo, hi) = xy
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(hi.abs() * 0.01).max(1.0);
    ((lo - pad).max(0.0), hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::dataset;

    #[test]
    fn svg_contains_panel_titles_and_caption() {
        let ds = dataset(&[
            ("512880", "证券ETF", &[100.0, 120.0, 130.0, 90.0, 150.0, 160.0]),
            ("512800", "银行ETF", &[50.0, 50.0, 55.0, 52.0, 58.0, 60.0]),
        ]);
        let series: Vec<&Series> = ds.iter().collect();
        let svg = render_chart_svg(&series, ReportContext::now(180), &ChartConfig::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("512880 证券ETF"));
        assert!(svg.contains("512800 银行ETF"));
        assert!(svg.contains("ETF场内份额趋势追踪"));
    }

    #[test]
    fn canvas_grows_with_rows_up_to_limit() {
        let cfg = ChartConfig::default();
        assert_eq!(cfg.canvas_size(1), (1980, 90 + 480));
        assert_eq!(cfg.canvas_size(4), (1980, 90 + 960));
        assert_eq!(cfg.canvas_size(100), (1980, 90 + 480 * 8));
        assert_eq!(cfg.capacity(), 24);
    }

    #[test]
    fn missing_font_file_falls_back() {
        let cfg = ChartConfig::default().with_font_file(Path::new("/nonexistent/SimHei.ttf"));
        assert_eq!(cfg.font_family, FALLBACK_FONT);
    }

    #[test]
    fn font_family_comes_from_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SimHei.ttf");
        std::fs::write(&path, b"not really a font").unwrap();
        let cfg = ChartConfig::default().with_font_file(&path);
        assert_eq!(cfg.font_family, "SimHei");
    }

    #[test]
    fn bounds_are_padded_and_non_negative() {
        let (lo, hi) = value_bounds(&[(0.0, 10.0), (1.0, 10.0)]);
        assert!(lo >= 0.0 && lo < 10.0);
        assert!(hi > 10.0);
        assert_eq!(value_bounds(&[]), (0.0, 1.0));
    }
}
