//! Projection of a [`Series`] onto a 2-D canvas: domain ranges, affine
//! scales, the trend polyline and axis ticks.
//!
//! Everything here is a pure function of its inputs and cheap enough to run
//! on every render.

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::model::Series;

/// Degrees added above and below the data so the line never touches the frame.
pub const TEMP_MARGIN: f64 = 5.0;
pub const DEFAULT_WIDTH: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self { top: 20.0, right: 20.0, bottom: 40.0, left: 40.0 }
    }
}

/// Coordinate transform for one render of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionFrame {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub min_temp: f64,
    pub max_temp: f64,
    pub min_year: i32,
    pub max_year: i32,
}

impl ProjectionFrame {
    pub fn chart_width(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    pub fn chart_height(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }

    /// Pixel x of `year`. A single-year domain maps everything to the horizontal midline.
    pub fn x_scale(&self, year: f64) -> f64 {
        let span = f64::from(self.max_year - self.min_year);
        if span == 0.0 {
            return self.padding.left + self.chart_width() / 2.0;
        }
        self.padding.left + (year - f64::from(self.min_year)) / span * self.chart_width()
    }

    /// Pixel y of `temp`; higher temperatures are drawn higher up.
    pub fn y_scale(&self, temp: f64) -> f64 {
        let span = self.max_temp - self.min_temp;
        if span == 0.0 {
            return self.padding.top + self.chart_height() / 2.0;
        }
        self.padding.top + self.chart_height() - (temp - self.min_temp) / span * self.chart_height()
    }

    /// Inverse of [`ProjectionFrame::x_scale`]: the (fractional) year under pixel `x`.
    pub fn year_at(&self, x: f64) -> f64 {
        let chart_width = self.chart_width();
        if chart_width == 0.0 {
            return f64::from(self.min_year);
        }
        let span = f64::from(self.max_year - self.min_year);
        f64::from(self.min_year) + (x - self.padding.left) / chart_width * span
    }

    /// Temperature labels: every `round(range / 5)` degrees from `ceil(min_temp)`.
    pub fn temperature_ticks(&self) -> Vec<i32> {
        let step = ((self.max_temp - self.min_temp) / 5.0).round();
        if step < 1.0 {
            return Vec::new();
        }

        let mut ticks = Vec::new();
        let mut t = self.min_temp.ceil();
        while t <= self.max_temp {
            ticks.push(t as i32);
            t += step;
        }
        ticks
    }

    /// Year labels: years divisible by 5 on long spans, by 2 otherwise.
    pub fn year_ticks(&self) -> Vec<i32> {
        let stride = if self.max_year - self.min_year > 10 { 5 } else { 2 };
        (self.min_year..=self.max_year).filter(|y| y.rem_euclid(stride) == 0).collect()
    }
}

/// Frame for `series`, using the placeholder domain when it is empty.
pub fn build_frame(series: &Series, width: f64, height: f64, padding: Padding) -> ProjectionFrame {
    build_frame_in(series, width, height, padding, Local::now().year())
}

/// Like [`build_frame`], with an explicit current year for the empty-series placeholder.
pub fn build_frame_in(
    series: &Series,
    width: f64,
    height: f64,
    padding: Padding,
    current_year: i32,
) -> ProjectionFrame {
    let (min_temp, max_temp) = match series.temperature_range() {
        Some((lo, hi)) => (lo - TEMP_MARGIN, hi + TEMP_MARGIN),
        None => (0.0, 40.0),
    };
    let (min_year, max_year) = series
        .year_range()
        .unwrap_or((current_year - 20, current_year - 1));

    ProjectionFrame { width, height, padding, min_temp, max_temp, min_year, max_year }
}

pub fn x_scale(frame: &ProjectionFrame, year: i32) -> f64 {
    frame.x_scale(f64::from(year))
}

pub fn y_scale(frame: &ProjectionFrame, temp: f64) -> f64 {
    frame.y_scale(temp)
}

/// The trend line, one vertex per record in ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polyline {
    pub points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data, e.g. `M 40 100 L 260 40`; empty for an empty line.
    pub fn to_svg_path(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| format!("{} {} {}", if i == 0 { 'M' } else { 'L' }, x, y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Empty when the series has fewer than two records.
pub fn build_path(frame: &ProjectionFrame, series: &Series) -> Polyline {
    if series.len() < 2 {
        return Polyline::default();
    }
    Polyline {
        points: series
            .iter()
            .map(|r| (x_scale(frame, r.year), y_scale(frame, r.temperature)))
            .collect(),
    }
}
