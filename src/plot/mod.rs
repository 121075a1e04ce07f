//! PNG chart rendering
//!
//! Every chart is split in two: a model with the numbers to draw (ranges,
//! points, labels), computed without touching the backend, and a draw
//! function that lays the model out with plotters.

pub mod baseline;
pub mod cost;
pub mod sweep;

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::catalog::Benchmark;
use crate::error::EvalResult;

pub type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub const FONT: &str = "sans-serif";

pub const BACKGROUND: RGBColor = RGBColor(0xFA, 0xFB, 0xFC);
pub const DARK: RGBColor = RGBColor(0x2C, 0x3E, 0x50);
pub const MUTED: RGBColor = RGBColor(0x7F, 0x8C, 0x8D);
pub const NEUTRAL: RGBColor = RGBColor(0x95, 0xA5, 0xA6);
pub const DIVIDER: RGBColor = RGBColor(0xCB, 0xD5, 0xE1);
pub const GRID: RGBColor = RGBColor(0xBD, 0xC3, 0xC7);
pub const SUCCESS: RGBColor = RGBColor(0x27, 0xAE, 0x60);
pub const DANGER: RGBColor = RGBColor(0xE7, 0x4C, 0x3C);
pub const BEST: RGBColor = RGBColor(0x1A, 0xBC, 0x9C);
pub const TREND: RGBColor = RGBColor(0x7C, 0x3A, 0xED);
pub const TREND_BAND: RGBColor = RGBColor(0x8B, 0x5C, 0xF6);
pub const IDEAL: RGBColor = RGBColor(0x0E, 0xA5, 0xE9);

/// Background zones of the boundedness charts
pub const COMPUTE_ZONE: RGBColor = RGBColor(0x10, 0xB9, 0x81);
pub const COMPUTE_TEXT: RGBColor = RGBColor(0x05, 0x96, 0x69);
pub const MEMORY_ZONE: RGBColor = RGBColor(0xEF, 0x44, 0x44);
pub const MEMORY_TEXT: RGBColor = RGBColor(0xDC, 0x26, 0x26);

pub fn benchmark_color(benchmark: Benchmark) -> RGBColor {
    match benchmark {
        Benchmark::Bzip => RGBColor(0x2E, 0x86, 0xAB),
        Benchmark::Hmmer => RGBColor(0xA2, 0x3B, 0x72),
        Benchmark::Mcf => RGBColor(0xF1, 0x8F, 0x01),
        Benchmark::Sjeng => RGBColor(0xC7, 0x3E, 0x1D),
        Benchmark::Libm => RGBColor(0x27, 0xAE, 0x60),
    }
}

pub fn font(size: u32) -> FontDesc<'static> {
    (FONT, size).into_font()
}

pub fn bold(size: u32) -> FontDesc<'static> {
    font(size).style(FontStyle::Bold)
}

/// Bold text centred on its anchor
pub fn centered(size: u32, color: &RGBColor) -> TextStyle<'static> {
    bold(size)
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

/// Opens a PNG canvas filled with the chart background
pub fn open(path: &Path, size: (u32, u32)) -> EvalResult<Root<'_>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;
    Ok(root)
}

/// Linear interpolation along evenly spaced colour stops, `t` in [0, 1]
pub fn lerp_color(stops: &[RGBColor], t: f64) -> RGBColor {
    match stops.len() {
        0 => BLACK,
        1 => stops[0],
        n => {
            let t = t.clamp(0.0, 1.0) * (n - 1) as f64;
            let i = (t.floor() as usize).min(n - 2);
            let f = t - i as f64;
            let (a, b) = (stops[i], stops[i + 1]);
            let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
            RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
        }
    }
}

/// Position of `value` in `[vmin, vmax]` on a log10 scale, clamped
pub fn log_norm(value: f64, vmin: f64, vmax: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    ((value.log10() - vmin.log10()) / (vmax.log10() - vmin.log10())).clamp(0.0, 1.0)
}

/// Position of `value` in `[vmin, vmax]`, clamped
pub fn linear_norm(value: f64, vmin: f64, vmax: f64) -> f64 {
    if vmax == vmin {
        return 0.0;
    }
    ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
}

/// Text box drawn in pixel space
pub struct Badge<'a> {
    pub lines: &'a [String],
    pub size: u32,
    pub text: RGBColor,
    pub fill: RGBColor,
    pub edge: RGBColor,
}

const BADGE_PAD: i32 = 6;

/// Draws a badge centred on `center`
pub fn draw_badge(root: &Root, center: (i32, i32), badge: &Badge) -> EvalResult<()> {
    let (cx, cy) = center;
    let line_h = (badge.size as f64 * 1.3) as i32;
    let widest = badge
        .lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let half_w = (widest as f64 * badge.size as f64 * 0.3) as i32 + BADGE_PAD;
    let half_h = line_h * badge.lines.len() as i32 / 2 + BADGE_PAD;

    let corners = [(cx - half_w, cy - half_h), (cx + half_w, cy + half_h)];
    root.draw(&Rectangle::new(corners, badge.fill.filled()))?;
    root.draw(&Rectangle::new(corners, badge.edge.stroke_width(2)))?;

    let top = cy - half_h + BADGE_PAD;
    for (i, line) in badge.lines.iter().enumerate() {
        let y = top + line_h * i as i32 + line_h / 2;
        root.draw(&Text::new(
            line.as_str(),
            (cx, y),
            centered(badge.size, &badge.text),
        ))?;
    }
    Ok(())
}

/// Horizontal text at a pixel position
pub fn draw_text(
    root: &Root,
    text: &str,
    at: (i32, i32),
    size: u32,
    color: &RGBColor,
) -> EvalResult<()> {
    root.draw(&Text::new(text, at, centered(size, color)))?;
    Ok(())
}

/// Bar label in thousands: `1500` as `1.5k`, `913.9` as `0.9k`
pub fn kilo_label(value: f64) -> String {
    format!("{:.1}k", value / 1000.0)
}

/// Axis tick in thousands, plain below 1000
pub fn kilo_tick(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.0}k", value / 1000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Arrow glyph for a percentage change where positive is a reduction
pub fn change_symbol(change: f64) -> &'static str {
    if change > 0.0 {
        "▼"
    } else {
        "▲"
    }
}
