//! Line-chart rendering of per-source series into PNG files.

use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use rand::Rng;

use super::backend::TextTolerantBackend;
use crate::config::PlotConfig;
use crate::error::PlotError;
use crate::parser::{PlotValue, SeriesMap};

/// One axis of a chart: its name and the per-source values along it.
#[derive(Debug, Clone, Copy)]
pub struct NamedSeries<'a, T> {
    pub name: &'a str,
    pub series: &'a SeriesMap<T>,
}

impl<'a, T> NamedSeries<'a, T> {
    pub fn new(name: &'a str, series: &'a SeriesMap<T>) -> Self {
        Self { name, series }
    }
}

/// One plotted line: a log source and its (x, y) points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Legend corner, derived from the y-axis name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    UpperRight,
    LowerRight,
}

impl LegendCorner {
    pub fn for_axis(y_axis_name: &str) -> Self {
        if y_axis_name.contains("accuracy") {
            LegendCorner::LowerRight
        } else if y_axis_name.contains("loss") || y_axis_name.contains("lr") {
            LegendCorner::UpperRight
        } else {
            LegendCorner::LowerRight
        }
    }
}

impl From<LegendCorner> for SeriesLabelPosition {
    fn from(corner: LegendCorner) -> Self {
        match corner {
            LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
            LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

/// Pair every y series with the x series of the same source.
///
/// Empty y series are skipped. A y series shorter than its x series takes the
/// leading part of x; any other length difference is a `ShapeMismatch`, as is
/// a difference in the source sets of the two mappings.
pub fn reconcile<Y: PlotValue, X: PlotValue>(y: &NamedSeries<'_, Y>, x: &NamedSeries<'_, X>) -> Result<Vec<TrendLine>, PlotError> {
    let same_sources = y.series.len() == x.series.len() && y.series.sources().all(|s| x.series.get(s).is_some());
    if !same_sources {
        return Err(PlotError::ShapeMismatch(format!(
            "'{}' and '{}' cover different log sources ({:?} vs {:?})",
            y.name,
            x.name,
            y.series.sources().collect::<Vec<_>>(),
            x.series.sources().collect::<Vec<_>>(),
        )));
    }

    let mut lines = Vec::with_capacity(y.series.len());
    for (source, ys) in y.series.iter() {
        let xs = x.series.get(source).unwrap_or_default();
        if ys.is_empty() {
            debug!("No '{}' values in {}, nothing to draw", y.name, source);
            continue;
        }
        if ys.len() > xs.len() {
            return Err(PlotError::ShapeMismatch(format!(
                "{}: {} '{}' values but only {} '{}' values",
                source,
                ys.len(),
                y.name,
                xs.len(),
                x.name
            )));
        }
        if ys.len() < xs.len() {
            debug!("{}: truncating '{}' from {} to {} values", source, x.name, xs.len(), ys.len());
        }

        let points = xs.iter().zip(ys).map(|(&xv, &yv)| (xv.to_f64(), yv.to_f64())).collect();
        lines.push(TrendLine {
            label: source.to_string(),
            points,
        });
    }
    Ok(lines)
}

/// Largest magnitude kept on an axis; the padded width of any range stays finite.
const AXIS_LIMIT: f64 = f64::MAX / 4.0;

/// Value range covering every point, padded so flat or empty data still has extent.
///
/// Values beyond `AXIS_LIMIT` are clamped to it.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad)..(max + pad);
    }
    let pad = (max - min) * 0.02;
    (min - pad)..(max + pad)
}

fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Draws one chart per call, each on its own fresh drawing surface.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    config: PlotConfig,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, config: PlotConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    /// `<output_dir>/<y axis name>_plot.png`, spaces in the name replaced by underscores.
    pub fn output_path(&self, y_axis_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}_plot.png", y_axis_name.replace(' ', "_")))
    }

    /// Draw `y` against `x`, one line per log source, and save the chart.
    ///
    /// Overwrites any existing file at the output path. Returns that path.
    pub fn render<Y: PlotValue, X: PlotValue>(&self, y: NamedSeries<'_, Y>, x: NamedSeries<'_, X>) -> Result<PathBuf, PlotError> {
        let lines = reconcile(&y, &x)?;
        let path = self.output_path(y.name);
        self.draw(&path, y.name, x.name, &lines)?;
        info!("Wrote {} ({} lines)", path.display(), lines.len());
        Ok(path)
    }

    fn draw(&self, path: &Path, y_name: &str, x_name: &str, lines: &[TrendLine]) -> Result<(), PlotError> {
        let x_range = axis_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p.0)));
        let y_range = axis_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));

        let backend = TextTolerantBackend::new(BitMapBackend::new(path, (self.config.width, self.config.height)));
        let root = backend.into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let caption = format!("{} vs. {}", y_name, x_name);
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", self.config.caption_font_size))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(x_name)
            .y_desc(y_name)
            .label_style(("sans-serif", self.config.label_font_size))
            .draw()
            .map_err(render_error)?;

        let mut rng = rand::thread_rng();
        for line in lines {
            let color = RGBColor(rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255));
            let style = color.stroke_width(self.config.line_width);
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), style))
                .map_err(render_error)?
                .label(&line.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        if !lines.is_empty() {
            chart
                .configure_series_labels()
                .position(LegendCorner::for_axis(y_name).into())
                .label_font(("sans-serif", self.config.label_font_size))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(render_error)?;
        }

        root.present().map_err(|e| PlotError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
