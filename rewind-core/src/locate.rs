//! Pointer hit-testing against a projected [`Series`].

use serde::Serialize;

use crate::{
    chart::ProjectionFrame,
    model::{Series, WeatherRecord},
};

/// The record under the pointer, snapped to its position on the trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoverPoint {
    pub x: f64,
    pub y: f64,
    pub year: i32,
    pub temperature: f64,
}

/// Record whose year is closest to the year under `pointer_x`.
///
/// Single pass in ascending year order; a later record only wins when it is
/// strictly closer, so ties resolve to the earlier year. `None` for an empty series.
pub fn locate<'a>(
    series: &'a Series,
    frame: &ProjectionFrame,
    pointer_x: f64,
) -> Option<&'a WeatherRecord> {
    let candidate = frame.year_at(pointer_x);
    let distance = |r: &WeatherRecord| (f64::from(r.year) - candidate).abs();

    series.iter().reduce(|closest, r| if distance(r) < distance(closest) { r } else { closest })
}

pub fn hover(series: &Series, frame: &ProjectionFrame, pointer_x: f64) -> Option<HoverPoint> {
    let record = locate(series, frame, pointer_x)?;
    Some(HoverPoint {
        x: frame.x_scale(f64::from(record.year)),
        y: frame.y_scale(record.temperature),
        year: record.year,
        temperature: record.temperature,
    })
}
