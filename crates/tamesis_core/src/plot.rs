//! Serializable description of a figure.
//!
//! Simulations only build these values; `render` turns them into pixels and the
//! JSON sidecar keeps titles, labels and the raw series.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLUE: Color = Color(0x1f, 0x77, 0xb4);
    pub const ORANGE: Color = Color(0xff, 0x7f, 0x0e);
    pub const GREEN: Color = Color(0x2c, 0xa0, 0x2c);
    pub const RED: Color = Color(0xd6, 0x27, 0x28);
    pub const PURPLE: Color = Color(0x94, 0x67, 0xbd);
    pub const GRAY: Color = Color(0x7f, 0x7f, 0x7f);
    pub const GOLD: Color = Color(0xff, 0xd7, 0x00);
    pub const LIME: Color = Color(0x00, 0xff, 0x00);
    pub const BLACK: Color = Color(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Line,
    Dashed,
    Dotted,
    Scatter,
    /// Filled region between `points` and `upper` (or zero when `upper` is empty).
    Band,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub color: Color,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upper: Vec<f64>,
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    2
}

impl Series {
    pub fn new(label: impl Into<String>, color: Color, style: SeriesStyle, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            color,
            style,
            points,
            upper: Vec::new(),
            width: default_width(),
        }
    }

    /// A line plotted against the sample index.
    pub fn indexed(label: impl Into<String>, color: Color, style: SeriesStyle, values: &[f64]) -> Self {
        Self::new(label, color, style, indexed_points(values))
    }

    pub fn xy(label: impl Into<String>, color: Color, style: SeriesStyle, x: &[f64], y: &[f64]) -> Self {
        Self::new(label, color, style, x.iter().copied().zip(y.iter().copied()).collect())
    }

    /// A filled band between `lower` and `upper`, both sampled at `x`.
    pub fn band(label: impl Into<String>, color: Color, x: &[f64], lower: &[f64], upper: &[f64]) -> Self {
        let mut series = Self::xy(label, color, SeriesStyle::Band, x, lower);
        series.upper = upper.to_vec();
        series
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }
}

pub fn indexed_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Guide {
    HLine { y: f64, color: Color, label: Option<String> },
    VLine { x: f64, color: Color, label: Option<String> },
    VSpan { from: f64, to: f64, color: Color, label: Option<String> },
    /// Rectangular shaded region in data coordinates.
    Region { x0: f64, x1: f64, y0: f64, y1: f64, color: Color, label: Option<String> },
    Annotation { x: f64, y: f64, text: String },
}

/// Row-major scalar field drawn under the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub guides: Vec<Guide>,
    pub heatmap: Option<Heatmap>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
}

impl Panel {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_guide(mut self, guide: Guide) -> Self {
        self.guides.push(guide);
        self
    }

    pub fn with_heatmap(mut self, heatmap: Heatmap) -> Self {
        self.heatmap = Some(heatmap);
        self
    }

    pub fn with_x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn with_y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some((min, max));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Single,
    /// Panels side by side.
    Columns,
    /// Panels stacked vertically.
    Rows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub layout: Layout,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn single(title: impl Into<String>, panel: Panel) -> Self {
        Self {
            title: title.into(),
            layout: Layout::Single,
            panels: vec![panel],
        }
    }

    pub fn columns(title: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            title: title.into(),
            layout: Layout::Columns,
            panels,
        }
    }

    pub fn rows(title: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            title: title.into(),
            layout: Layout::Rows,
            panels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_series_uses_sample_index_as_x() {
        let series = Series::indexed("s", Color::BLUE, SeriesStyle::Line, &[3.0, 4.0]);
        assert_eq!(series.points, vec![(0.0, 3.0), (1.0, 4.0)]);
    }

    #[test]
    fn band_keeps_upper_edge() {
        let series = Series::band("b", Color::RED, &[0.0, 1.0], &[1.0, 2.0], &[3.0, 4.0]);
        assert_eq!(series.style, SeriesStyle::Band);
        assert_eq!(series.upper, vec![3.0, 4.0]);
    }

    #[test]
    fn figure_serializes_with_tagged_guides() {
        let figure = Figure::single(
            "t",
            Panel::new("p", "x", "y").with_guide(Guide::VLine {
                x: 2.0,
                color: Color::GRAY,
                label: None,
            }),
        );
        let json = serde_json::to_string(&figure).expect("serialize");
        assert!(json.contains("\"kind\":\"v_line\""));
        assert!(json.contains("\"layout\":\"single\""));
        let back: Figure = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, figure);
    }
}
