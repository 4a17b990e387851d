//! Draws a [`Figure`] with `plotters` into an RGB buffer and saves it as PNG.
//!
//! Captions, axis descriptions, legends and annotations need a system font. When
//! none can be loaded the figure is drawn again without text so batch runs on
//! headless machines still produce images; the JSON sidecar keeps every label.

use crate::plot::{Color, Figure, Guide, Heatmap, Layout, Panel, Series, SeriesStyle};
use image::{ImageFormat, RgbImage};
use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MIN_DIMENSION: u32 = 200;
const MAX_DIMENSION: u32 = 8000;
const FONT: &str = "sans-serif";
const SPAN_ALPHA: f64 = 0.15;
const BAND_ALPHA: f64 = 0.25;
const GRID: RGBColor = RGBColor(235, 235, 235);

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Figure has no panels to render")]
    EmptyFigure,

    #[error("Image dimensions {width}x{height} are outside [200, 8000]")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Plotting failed: {0}")]
    Plotters(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Plotters(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub write_metadata: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 720,
            write_metadata: true,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), RenderError> {
        let valid = |v: u32| (MIN_DIMENSION..=MAX_DIMENSION).contains(&v);
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }
}

pub fn render_figure(figure: &Figure, options: &RenderOptions) -> Result<RgbImage, RenderError> {
    options.validate()?;
    if figure.panels.is_empty() {
        return Err(RenderError::EmptyFigure);
    }
    match rasterize(figure, options, true) {
        Err(RenderError::Plotters(message)) => {
            tracing::warn!("drawing without text: {message}");
            rasterize(figure, options, false)
        }
        other => other,
    }
}

/// Renders `figure` to `path` as PNG, creating parent directories. When metadata is
/// enabled the figure model is also written next to it with a `.json` extension.
pub fn save_figure(figure: &Figure, path: &Path, options: &RenderOptions) -> Result<PathBuf, RenderError> {
    let image = render_figure(figure, options)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, ImageFormat::Png)?;
    if options.write_metadata {
        let json = serde_json::to_string_pretty(figure)?;
        fs::write(path.with_extension("json"), json)?;
    }
    Ok(path.to_path_buf())
}

fn rasterize(figure: &Figure, options: &RenderOptions, text: bool) -> Result<RgbImage, RenderError> {
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = if text && figure.panels.len() > 1 && !figure.title.is_empty() {
            root.titled(&figure.title, (FONT, 26))?
        } else {
            root
        };
        let areas = match figure.layout {
            Layout::Single => root.split_evenly((1, 1)),
            Layout::Columns => root.split_evenly((1, figure.panels.len())),
            Layout::Rows => root.split_evenly((figure.panels.len(), 1)),
        };
        for (panel, area) in figure.panels.iter().zip(&areas) {
            draw_panel(area, panel, text)?;
        }
        root.present()?;
    }
    RgbImage::from_raw(width, height, buffer).ok_or(RenderError::InvalidDimensions { width, height })
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &Panel, text: bool) -> Result<(), RenderError> {
    let (x0, x1) = panel.x_range.unwrap_or_else(|| padded(data_extent(panel, Axis::X)));
    let (y0, y1) = panel.y_range.unwrap_or_else(|| padded(data_extent(panel, Axis::Y)));

    let mut builder = ChartBuilder::on(area);
    builder.margin(12);
    if text {
        builder.x_label_area_size(40).y_label_area_size(60);
        if !panel.title.is_empty() {
            builder.caption(&panel.title, (FONT, 20));
        }
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(GRID);
        if text {
            mesh.x_desc(panel.x_label.as_str()).y_desc(panel.y_label.as_str());
        }
        mesh.draw()?;
    }

    if let Some(heatmap) = &panel.heatmap {
        draw_heatmap(&mut chart, heatmap)?;
    }
    for guide in &panel.guides {
        draw_shading(&mut chart, guide, (y0, y1))?;
    }
    for series in panel.series.iter().filter(|s| s.style == SeriesStyle::Band) {
        draw_series(&mut chart, series)?;
    }
    for series in panel.series.iter().filter(|s| s.style != SeriesStyle::Band) {
        draw_series(&mut chart, series)?;
    }
    for guide in &panel.guides {
        draw_guide(&mut chart, guide, (x0, x1), (y0, y1), text)?;
    }

    if text && has_legend(panel) {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn data_extent(panel: &Panel, axis: Axis) -> (f64, f64) {
    let mut values: Vec<f64> = Vec::new();
    for series in &panel.series {
        for &(x, y) in &series.points {
            values.push(match axis {
                Axis::X => x,
                Axis::Y => y,
            });
        }
        if let Axis::Y = axis {
            values.extend(series.upper.iter().copied());
            if series.style == SeriesStyle::Band && series.upper.is_empty() {
                values.push(0.0);
            }
        }
    }
    for guide in &panel.guides {
        match (guide, axis) {
            (Guide::HLine { y, .. }, Axis::Y) => values.push(*y),
            (Guide::VLine { x, .. }, Axis::X) => values.push(*x),
            (Guide::VSpan { from, to, .. }, Axis::X) => values.extend([*from, *to]),
            (Guide::Region { x0, x1, .. }, Axis::X) => values.extend([*x0, *x1]),
            (Guide::Region { y0, y1, .. }, Axis::Y) => values.extend([*y0, *y1]),
            (Guide::Annotation { x, .. }, Axis::X) => values.push(*x),
            (Guide::Annotation { y, .. }, Axis::Y) => values.push(*y),
            _ => {}
        }
    }
    if let Some(heatmap) = &panel.heatmap {
        match axis {
            Axis::X => values.extend([0.0, heatmap.cols as f64]),
            Axis::Y => values.extend([0.0, heatmap.rows as f64]),
        }
    }
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 1.0))
}

fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON * (1.0 + lo.abs().max(hi.abs())) {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - 0.05 * span, hi + 0.05 * span)
}

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn finite(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn has_legend(panel: &Panel) -> bool {
    panel.series.iter().any(|s| !s.label.is_empty())
        || panel.guides.iter().any(|g| {
            matches!(
                g,
                Guide::HLine { label: Some(_), .. }
                    | Guide::VLine { label: Some(_), .. }
                    | Guide::VSpan { label: Some(_), .. }
                    | Guide::Region { label: Some(_), .. }
            )
        })
}

fn draw_series(chart: &mut Chart<'_, '_>, series: &Series) -> Result<(), RenderError> {
    let color = rgb(series.color);
    let style = color.stroke_width(series.width);
    let points = finite(&series.points);
    let anno = match series.style {
        SeriesStyle::Line => chart.draw_series(LineSeries::new(points, style))?,
        SeriesStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 8, 5, style))?,
        SeriesStyle::Dotted => chart.draw_series(DashedLineSeries::new(points, 2, 4, style))?,
        SeriesStyle::Scatter => {
            let radius = series.width.max(2) + 1;
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, radius, color.filled())))?
        }
        SeriesStyle::Band if series.upper.is_empty() => {
            chart.draw_series(AreaSeries::new(points, 0.0, color.mix(BAND_ALPHA)))?
        }
        SeriesStyle::Band => {
            let n = series.points.len().min(series.upper.len());
            let mut outline: Vec<(f64, f64)> = series.points[..n]
                .iter()
                .zip(&series.upper)
                .map(|(&(x, _), &upper)| (x, upper))
                .collect();
            outline.extend(series.points[..n].iter().rev().copied());
            let outline = finite(&outline);
            chart.draw_series(std::iter::once(Polygon::new(outline, color.mix(BAND_ALPHA).filled())))?
        }
    };

    if !series.label.is_empty() {
        if series.style == SeriesStyle::Band {
            anno.label(series.label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(BAND_ALPHA).filled())
            });
        } else {
            anno.label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }
    Ok(())
}

fn draw_shading(chart: &mut Chart<'_, '_>, guide: &Guide, (y0, y1): (f64, f64)) -> Result<(), RenderError> {
    let (corners, color, label) = match guide {
        Guide::VSpan { from, to, color, label } => ([(*from, y0), (*to, y1)], *color, label),
        Guide::Region {
            x0,
            x1,
            y0,
            y1,
            color,
            label,
        } => ([(*x0, *y0), (*x1, *y1)], *color, label),
        _ => return Ok(()),
    };
    let fill = rgb(color).mix(SPAN_ALPHA);
    let anno = chart.draw_series(std::iter::once(Rectangle::new(corners, fill.filled())))?;
    if let Some(label) = label {
        anno.label(label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.filled()));
    }
    Ok(())
}

fn draw_guide(
    chart: &mut Chart<'_, '_>,
    guide: &Guide,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    text: bool,
) -> Result<(), RenderError> {
    let (line, color, label) = match guide {
        Guide::HLine { y, color, label } => (vec![(x0, *y), (x1, *y)], *color, label),
        Guide::VLine { x, color, label } => (vec![(*x, y0), (*x, y1)], *color, label),
        Guide::Annotation { x, y, text: note } => {
            if text {
                chart.draw_series(std::iter::once(Text::new(
                    note.clone(),
                    (*x, *y),
                    (FONT, 16).into_font(),
                )))?;
            }
            return Ok(());
        }
        _ => return Ok(()),
    };
    let color = rgb(color);
    let anno = chart.draw_series(DashedLineSeries::new(line, 8, 5, color.stroke_width(2)))?;
    if let Some(label) = label {
        anno.label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    Ok(())
}

fn draw_heatmap(chart: &mut Chart<'_, '_>, heatmap: &Heatmap) -> Result<(), RenderError> {
    let (rows, cols) = (heatmap.rows, heatmap.cols);
    if rows == 0 || cols == 0 || heatmap.values.len() != rows * cols {
        return Ok(());
    }
    let lo = heatmap.values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = heatmap.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let cells = (0..rows).flat_map(|row| (0..cols).map(move |col| (row, col)));
    chart.draw_series(cells.map(|(row, col)| {
        let value = heatmap.values[row * cols + col];
        Rectangle::new(
            [(col as f64, row as f64), ((col + 1) as f64, (row + 1) as f64)],
            heat_color((value - lo) / span).filled(),
        )
    }))?;
    Ok(())
}

/// Cold-to-warm hue ramp over `t` in [0, 1].
fn heat_color(t: f64) -> HSLColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    HSLColor(0.66 * (1.0 - t), 0.75, 0.5)
}
