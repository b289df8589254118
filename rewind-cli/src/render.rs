//! Terminal and SVG output.

use rewind_core::{HoverPoint, ProjectionFrame, Series, WeatherRecord, build_path};
use std::fmt::Write;

pub fn today_card(today: &WeatherRecord) -> String {
    format!(
        "Today, {date} {year}\n  {city}\n  {temp}°C  {condition}\n  Wind {wind} km/h   Humidity {humidity}%\n",
        date = today.date,
        year = today.year,
        city = today.city,
        temp = today.temperature,
        condition = today.condition,
        wind = today.wind_speed,
        humidity = today.humidity,
    )
}

/// The last `years` records, most recent first. Empty for an empty series.
pub fn history_table(history: &Series, years: usize) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut out = format!("Recent History (Last {years} Years)\n");
    for w in history.recent(years) {
        let _ = writeln!(
            out,
            "  {:<6}{:>6}  {:<14}{:>8}  {:>4}",
            w.year,
            format!("{}°C", w.temperature),
            w.condition.label(),
            format!("{} km/h", w.wind_speed),
            format!("{}%", w.humidity),
        );
    }
    out
}

pub fn hover_readout(point: &HoverPoint) -> String {
    format!("{}: {}°C", point.year, point.temperature)
}

pub fn summary(text: &str) -> String {
    format!("AI Trend Analysis\n\n{}\n", text.trim_end())
}

/// Standalone SVG document of the temperature trend.
pub fn chart_svg(
    history: &Series,
    frame: &ProjectionFrame,
    hovered: Option<&HoverPoint>,
) -> String {
    let pad = frame.padding;
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif" font-size="12">
<rect width="100%" height="100%" fill="#111827"/>
<defs><linearGradient id="line-gradient" x1="0%" y1="0%" x2="100%" y2="0%"><stop offset="0%" stop-color="#22d3ee"/><stop offset="100%" stop-color="#a78bfa"/></linearGradient></defs>
"##,
        w = frame.width,
        h = frame.height,
    );

    for t in frame.temperature_ticks() {
        let y = frame.y_scale(f64::from(t));
        let _ = writeln!(
            svg,
            r##"<text x="{lx}" y="{y:.1}" dominant-baseline="middle" text-anchor="end" fill="#9ca3af">{t}°</text><line x1="{x1}" x2="{x2}" y1="{y:.1}" y2="{y:.1}" stroke="#4b5563" stroke-width="0.5" stroke-dasharray="2,2"/>"##,
            lx = pad.left - 8.0,
            x1 = pad.left,
            x2 = frame.width - pad.right,
        );
    }

    for year in frame.year_ticks() {
        let _ = writeln!(
            svg,
            r##"<text x="{x:.1}" y="{y}" text-anchor="middle" fill="#9ca3af">{year}</text>"##,
            x = frame.x_scale(f64::from(year)),
            y = frame.height - pad.bottom + 15.0,
        );
    }

    let path = build_path(frame, history);
    if !path.is_empty() {
        let _ = writeln!(
            svg,
            r#"<path d="{}" fill="none" stroke="url(#line-gradient)" stroke-width="2" stroke-linecap="round"/>"#,
            path.to_svg_path(),
        );
    }

    if let Some(p) = hovered {
        let _ = writeln!(
            svg,
            r##"<line x1="{x:.1}" y1="{top}" x2="{x:.1}" y2="{bottom}" stroke="#a78bfa" stroke-dasharray="3,3"/><circle cx="{x:.1}" cy="{y:.1}" r="4" fill="#a78bfa" stroke="#111827" stroke-width="2"/><text x="{x:.1}" y="{ty:.1}" text-anchor="middle" fill="#ffffff">{label}</text>"##,
            x = p.x,
            y = p.y,
            top = pad.top,
            bottom = frame.height - pad.bottom,
            ty = p.y - 10.0,
            label = hover_readout(p),
        );
    }

    svg.push_str("</svg>\n");
    svg
}
