//! Baseline charts: CPI/time overview, miss rate heatmap, clock scaling
//! and memory upgrade studies

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use super::{
    bold, centered, draw_badge, draw_text, font, lerp_color, linear_norm,
    log_norm, open, Badge, COMPUTE_TEXT, COMPUTE_ZONE, DARK, DIVIDER, IDEAL, MEMORY_TEXT,
    MEMORY_ZONE, TREND, TREND_BAND,
};
use crate::baseline::{
    scaling_correlation, Band, ScalingPoint, UpgradePoint, SCALING_MEMORY_BOUND_L2_PCT,
    UPGRADE_MEMORY_BOUND_EFFECTIVE,
};
use crate::catalog::BaselineRun;
use crate::error::{EvalError, EvalResult};
use crate::stats::{self, LinearFit};

const CPI_COLOR: RGBColor = RGBColor(0x25, 0x63, 0xEB);
const SIM_COLOR: RGBColor = RGBColor(0x7C, 0x3A, 0xED);
const IDEAL_CPI_COLOR: RGBColor = RGBColor(0x80, 0x80, 0x80);
const SUBTITLE: RGBColor = RGBColor(0x64, 0x74, 0x8B);

/// Reversed red-yellow-green: low miss rates green, high ones red
const MISS_STOPS: [RGBColor; 5] = [
    RGBColor(0x1A, 0x98, 0x50),
    RGBColor(0x91, 0xCF, 0x60),
    RGBColor(0xFF, 0xFF, 0xBF),
    RGBColor(0xFC, 0x8D, 0x59),
    RGBColor(0xD7, 0x30, 0x27),
];
const MISS_MIN: f64 = 0.001;
const MISS_MAX: f64 = 100.0;

const EFFICIENCY_STOPS: [RGBColor; 4] = [
    RGBColor(0xDC, 0x26, 0x26),
    RGBColor(0xF5, 0x9E, 0x0B),
    RGBColor(0x22, 0xC5, 0x5E),
    RGBColor(0x05, 0x96, 0x69),
];
const IMPROVEMENT_STOPS: [RGBColor; 4] = [
    RGBColor(0x94, 0xA3, 0xB8),
    RGBColor(0xF5, 0x9E, 0x0B),
    RGBColor(0xEF, 0x44, 0x44),
    RGBColor(0xDC, 0x26, 0x26),
];

/// Text, fill and edge colours of a label in a band
fn band_colors(band: Band) -> (RGBColor, RGBColor, RGBColor) {
    match band {
        Band::Good => (
            RGBColor(0x04, 0x78, 0x57),
            RGBColor(0xD1, 0xFA, 0xE5),
            RGBColor(0x10, 0xB9, 0x81),
        ),
        Band::Moderate => (
            RGBColor(0xB4, 0x53, 0x09),
            RGBColor(0xFE, 0xF3, 0xC7),
            RGBColor(0xF5, 0x9E, 0x0B),
        ),
        Band::Poor => (
            RGBColor(0xB9, 0x1C, 0x1C),
            RGBColor(0xFE, 0xE2, 0xE2),
            RGBColor(0xEF, 0x44, 0x44),
        ),
    }
}

/// CPI and simulated time side by side
#[derive(Clone, Debug, PartialEq)]
pub struct DualAxisModel {
    pub labels: Vec<String>,
    pub cpi: Vec<f64>,
    pub sim_seconds: Vec<f64>,
    pub cpi_max: f64,
    pub sim_max: f64,
}

/// Both axes get 15% headroom over their tallest bar
pub fn dual_axis_model(runs: &[BaselineRun]) -> Option<DualAxisModel> {
    if runs.is_empty() {
        return None;
    }
    let cpi: Vec<f64> = runs.iter().map(|r| r.cpi).collect();
    let sim_seconds: Vec<f64> = runs.iter().map(|r| r.sim_seconds).collect();
    let cpi_max = cpi.iter().cloned().fold(0.0, f64::max) * 1.15;
    let sim_max = sim_seconds.iter().cloned().fold(0.0, f64::max) * 1.15;
    Some(DualAxisModel {
        labels: runs
            .iter()
            .map(|r| r.benchmark.short_name().to_string())
            .collect(),
        cpi,
        sim_seconds,
        cpi_max: if cpi_max > 0.0 { cpi_max } else { 1.0 },
        sim_max: if sim_max > 0.0 { sim_max } else { 1.0 },
    })
}

pub fn draw_dual_axis(path: &Path, model: &DualAxisModel) -> EvalResult<()> {
    let root = open(path, (1800, 900))?;
    let n = model.labels.len() as f64;
    let x_range = -0.5..n - 0.5;
    let width = 0.35;

    let mut chart = ChartBuilder::on(&root)
        .caption("CPI vs Simulation Time — Dual Axis View", bold(36))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .right_y_label_area_size(110)
        .build_cartesian_2d(x_range.clone(), 0.0..model.cpi_max)?
        .set_secondary_coord(x_range.clone(), 0.0..model.sim_max);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|_| String::new())
        .y_labels(6)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .y_desc("CPI (Cycles Per Instruction)")
        .axis_desc_style(bold(22).color(&CPI_COLOR))
        .label_style(font(18).color(&CPI_COLOR))
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{:.2}s", v))
        .y_desc("Simulation Time (seconds)")
        .axis_desc_style(bold(22).color(&SIM_COLOR))
        .label_style(font(18).color(&SIM_COLOR))
        .draw()?;

    chart
        .draw_series(model.cpi.iter().enumerate().map(|(i, v)| {
            let x = i as f64;
            Rectangle::new([(x - width, 0.0), (x, *v)], CPI_COLOR.filled())
        }))?
        .label("CPI")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], CPI_COLOR.filled()));
    chart.draw_series(model.cpi.iter().enumerate().map(|(i, v)| {
        EmptyElement::at((i as f64 - width / 2.0, *v))
            + Text::new(format!("{:.2}", v), (0, -14), centered(18, &CPI_COLOR))
    }))?;

    chart
        .draw_secondary_series(model.sim_seconds.iter().enumerate().map(|(i, v)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + width, *v)], SIM_COLOR.filled())
        }))?
        .label("Sim Time")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], SIM_COLOR.filled()));
    chart.draw_secondary_series(model.sim_seconds.iter().enumerate().map(|(i, v)| {
        EmptyElement::at((i as f64 + width / 2.0, *v))
            + Text::new(format!("{:.3}s", v), (0, -14), centered(18, &SIM_COLOR))
    }))?;

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_range.start, 1.0), (x_range.end, 1.0)],
            10,
            6,
            IDEAL_CPI_COLOR.stroke_width(2),
        ))?
        .label("Ideal CPI = 1")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], IDEAL_CPI_COLOR));

    for (i, label) in model.labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, 0.0));
        draw_text(&root, label, (px, py + 24), 20, &DARK)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(font(18))
        .background_style(WHITE.mix(0.9))
        .border_style(DIVIDER)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Miss rates (%) per benchmark row and cache level column
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapModel {
    pub rows: Vec<String>,
    pub columns: Vec<&'static str>,
    pub values: Vec<[f64; 3]>,
}

pub fn heatmap_model(runs: &[BaselineRun]) -> Option<HeatmapModel> {
    if runs.is_empty() {
        return None;
    }
    Some(HeatmapModel {
        rows: runs
            .iter()
            .map(|r| r.benchmark.short_name().to_string())
            .collect(),
        columns: vec!["L1 Instruction", "L1 Data", "L2"],
        values: runs
            .iter()
            .map(|r| [r.l1i_miss_pct, r.l1d_miss_pct, r.l2_miss_pct])
            .collect(),
    })
}

/// Cell colour on a log scale from 0.001% to 100%
pub fn miss_color(value: f64) -> RGBColor {
    lerp_color(&MISS_STOPS, log_norm(value, MISS_MIN, MISS_MAX))
}

/// Dark cells get white text
pub fn miss_text_color(value: f64) -> RGBColor {
    if value > 10.0 {
        WHITE
    } else {
        BLACK
    }
}

pub fn draw_heatmap(path: &Path, model: &HeatmapModel) -> EvalResult<()> {
    let root = open(path, (1200, 900))?;
    let (main, bar) = root.split_horizontally(1000);

    let cols = model.columns.len() as f64;
    let rows = model.rows.len() as f64;
    // First benchmark on top; row labels left of the grid, level labels below
    let top = |r: usize| rows - 1.0 - r as f64;
    let mut chart = ChartBuilder::on(&main)
        .caption("Cache Miss Rate Heatmap", bold(32))
        .margin(20)
        .build_cartesian_2d(-1.0..cols, -0.6..rows)?;

    chart.draw_series(model.values.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, v)| {
            let (x, y) = (c as f64, top(r));
            Rectangle::new([(x, y), (x + 1.0, y + 1.0)], miss_color(*v).filled())
        })
    }))?;
    chart.draw_series(model.values.iter().enumerate().flat_map(|(r, row)| {
        (0..row.len()).map(move |c| {
            let (x, y) = (c as f64, top(r));
            Rectangle::new([(x, y), (x + 1.0, y + 1.0)], WHITE.stroke_width(3))
        })
    }))?;
    chart.draw_series(model.values.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, v)| {
            Text::new(
                format!("{:.2}%", v),
                (c as f64 + 0.5, top(r) + 0.5),
                centered(20, &miss_text_color(*v)),
            )
        })
    }))?;

    for (r, label) in model.rows.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(-0.5, top(r) + 0.5));
        draw_text(&main, label, (px, py), 20, &DARK)?;
    }
    for (c, label) in model.columns.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(c as f64 + 0.5, -0.3));
        draw_text(&main, label, (px, py), 20, &DARK)?;
    }

    draw_log_colorbar(&bar)?;
    root.present()?;
    Ok(())
}

/// Vertical colour bar for the log-normalised miss rate scale
fn draw_log_colorbar(area: &super::Root) -> EvalResult<()> {
    let mut chart = ChartBuilder::on(area)
        .margin_top(120)
        .margin_bottom(120)
        .margin_right(20)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, (MISS_MIN..MISS_MAX).log_scale())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Miss Rate (%)")
        .axis_desc_style(bold(18))
        .y_label_formatter(&|v| format!("{}", v))
        .label_style(font(16))
        .draw()?;

    let steps = stats::logspace(MISS_MIN, MISS_MAX, 101);
    chart.draw_series(steps.windows(2).map(|w| {
        Rectangle::new([(0.0, w[0]), (1.0, w[1])], miss_color(w[0]).filled())
    }))?;
    Ok(())
}

/// Clock scaling study: efficiency over L2 miss rate
#[derive(Clone, Debug, PartialEq)]
pub struct ScalingModel {
    pub points: Vec<ScalingPoint>,
    pub trend: Option<LinearFit>,
    pub correlation: Option<f64>,
}

pub fn scaling_model(points: &[ScalingPoint]) -> ScalingModel {
    let xs: Vec<f64> = points.iter().map(|p| p.l2_miss_pct).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.efficiency).collect();
    ScalingModel {
        points: points.to_vec(),
        trend: stats::linear_fit(&xs, &ys),
        correlation: scaling_correlation(points),
    }
}

/// Bubble radius in pixels, area proportional to CPI at 4GHz
pub fn scaling_radius(cpi_4ghz: f64) -> i32 {
    ((cpi_4ghz * 45.0).sqrt() * 1.2).round().max(4.0) as i32
}

/// Label offset in pixels, keeping crowded labels apart
fn scaling_offset(point: &ScalingPoint) -> (i32, i32) {
    use crate::catalog::Benchmark::*;
    match point.benchmark {
        Bzip => (70, -30),
        Mcf => (-60, 30),
        Hmmer => (60, -40),
        Sjeng => (-80, 30),
        Libm => (-70, -40),
    }
}

pub fn draw_scaling(path: &Path, model: &ScalingModel) -> EvalResult<()> {
    if model.points.is_empty() {
        return Err(EvalError::NoData("no clock scaling points".to_string()));
    }
    let root = open(path, (1800, 1200))?;
    root.fill(&WHITE)?;

    let (x_min, x_max) = (-5.0, 115.0);
    let (y_min, y_max) = (35.0, 112.0);
    let rho = model.correlation.unwrap_or(f64::NAN);

    let mut chart = ChartBuilder::on(&root)
        .caption("Frequency Scaling Efficiency vs Cache Miss Rate", bold(36))
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(DIVIDER.mix(0.4))
        .x_desc("L2 Cache Miss Rate (%)")
        .y_desc("Scaling Efficiency (1GHz → 4GHz)")
        .axis_desc_style(bold(24))
        .label_style(font(18))
        .draw()?;

    let split = SCALING_MEMORY_BOUND_L2_PCT;
    chart.draw_series([
        Rectangle::new([(0.0, y_min), (split, y_max)], COMPUTE_ZONE.mix(0.15).filled()),
        Rectangle::new([(split, y_min), (x_max, y_max)], MEMORY_ZONE.mix(0.15).filled()),
    ])?;
    chart.draw_series(DashedLineSeries::new(
        vec![(split, y_min), (split, y_max)],
        10,
        6,
        DIVIDER.stroke_width(2),
    ))?;
    chart.draw_series([
        Text::new("COMPUTE-BOUND", (split / 2.0, 108.0), centered(18, &COMPUTE_TEXT)),
        Text::new(
            "MEMORY-BOUND",
            ((split + x_max) / 2.0, 108.0),
            centered(18, &MEMORY_TEXT),
        ),
    ])?;

    if let Some(fit) = model.trend {
        let xs = stats::linspace(x_min, x_max, 200);
        chart.draw_series(LineSeries::new(
            xs.iter().map(|x| (*x, fit.eval(*x))),
            TREND_BAND.mix(0.15).stroke_width(10),
        ))?;
        chart
            .draw_series(DashedLineSeries::new(
                xs.iter().map(|x| (*x, fit.eval(*x))).collect::<Vec<_>>(),
                12,
                8,
                TREND.stroke_width(3),
            ))?
            .label(format!("Trend (ρ = {:.2})", rho))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], TREND.stroke_width(3)));
    }

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_min, 100.0), (x_max, 100.0)],
            10,
            6,
            IDEAL.stroke_width(2),
        ))?
        .label("Ideal 100% Scaling")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], IDEAL.stroke_width(2)));

    let color_of = |p: &ScalingPoint| lerp_color(&EFFICIENCY_STOPS, linear_norm(p.efficiency, 40.0, 100.0));
    chart.draw_series(model.points.iter().map(|p| {
        let r = (scaling_radius(p.cpi_4ghz) as f64 * 1.26) as i32;
        Circle::new((p.l2_miss_pct, p.efficiency), r, color_of(p).mix(0.12).filled())
    }))?;
    chart.draw_series(model.points.iter().map(|p| {
        Circle::new(
            (p.l2_miss_pct, p.efficiency),
            scaling_radius(p.cpi_4ghz),
            color_of(p).mix(0.9).filled(),
        )
    }))?;
    chart.draw_series(model.points.iter().map(|p| {
        Circle::new(
            (p.l2_miss_pct, p.efficiency),
            scaling_radius(p.cpi_4ghz),
            WHITE.stroke_width(3),
        )
    }))?;

    for point in &model.points {
        let (px, py) = chart.backend_coord(&(point.l2_miss_pct, point.efficiency));
        let (dx, dy) = scaling_offset(point);
        let (text, fill, edge) = band_colors(point.band());
        let lines = [
            point.benchmark.short_name().to_string(),
            format!("{:.0}%", point.efficiency),
        ];
        draw_badge(
            &root,
            (px + dx, py + dy),
            &Badge {
                lines: &lines,
                size: 18,
                text,
                fill,
                edge,
            },
        )?;
    }

    let subtitle = format!(
        "Strong negative correlation (ρ = {:.2}) · Bubble size ∝ CPI at 4 GHz",
        rho
    );
    let (cx, _) = chart.backend_coord(&((x_min + x_max) / 2.0, y_max));
    draw_text(&root, &subtitle, (cx, 80), 18, &SUBTITLE)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .label_font(font(18))
        .background_style(WHITE.mix(0.95))
        .border_style(DIVIDER)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Memory upgrade study on a log effective-miss axis
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeModel {
    pub points: Vec<UpgradePoint>,
    pub trend: Option<LinearFit>,
    pub correlation: Option<f64>,
    pub r_squared: Option<f64>,
}

pub const UPGRADE_X_MIN: f64 = 0.005;
pub const UPGRADE_X_MAX: f64 = 20.0;

pub fn upgrade_model(points: &[UpgradePoint]) -> UpgradeModel {
    let xs: Vec<f64> = points.iter().map(|p| p.effective_miss).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.improvement).collect();
    UpgradeModel {
        points: points.to_vec(),
        trend: stats::linear_fit(&xs, &ys),
        correlation: stats::correlation(&xs, &ys),
        r_squared: stats::r_squared(&xs, &ys),
    }
}

/// Trend evaluated on a log grid; the straight fit curves on a log axis
pub fn upgrade_trend_line(fit: &LinearFit) -> Vec<(f64, f64)> {
    stats::logspace(UPGRADE_X_MIN, UPGRADE_X_MAX, 200)
        .into_iter()
        .map(|x| (x, fit.eval(x)))
        .collect()
}

fn upgrade_offset(point: &UpgradePoint) -> (i32, i32) {
    use crate::catalog::Benchmark::*;
    match point.benchmark {
        Hmmer => (70, 30),
        Mcf => (-70, -40),
        Bzip => (-80, -45),
        Libm => (-90, -45),
        Sjeng => (-100, 40),
    }
}

pub fn draw_upgrade(path: &Path, model: &UpgradeModel) -> EvalResult<()> {
    if model.points.is_empty() {
        return Err(EvalError::NoData("no memory upgrade points".to_string()));
    }
    let root = open(path, (1800, 1200))?;
    root.fill(&WHITE)?;

    let (y_min, y_max) = (-0.3, 4.8);
    let rho = model.correlation.unwrap_or(f64::NAN);
    let r2 = model.r_squared.unwrap_or(f64::NAN);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Memory Upgrade Benefit: DDR3_1600 → DDR3_2133 (+33% Bandwidth)",
            bold(34),
        )
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d((UPGRADE_X_MIN..UPGRADE_X_MAX).log_scale(), y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(DIVIDER.mix(0.4))
        .x_desc("Effective DRAM Miss Rate  (L1d Miss × L2 Miss / 100)")
        .y_desc("Simulation Time Improvement from Memory Upgrade (%)")
        .x_label_formatter(&|v| format!("{}", v))
        .axis_desc_style(bold(24))
        .label_style(font(18))
        .draw()?;

    let split = UPGRADE_MEMORY_BOUND_EFFECTIVE;
    chart.draw_series([
        Rectangle::new([(UPGRADE_X_MIN, y_min), (split, y_max)], COMPUTE_ZONE.mix(0.12).filled()),
        Rectangle::new([(split, y_min), (UPGRADE_X_MAX, y_max)], MEMORY_ZONE.mix(0.12).filled()),
    ])?;
    chart.draw_series(DashedLineSeries::new(
        vec![(split, y_min), (split, y_max)],
        10,
        6,
        DIVIDER.stroke_width(2),
    ))?;
    chart.draw_series([
        Text::new("COMPUTE-BOUND", (0.07, 4.4), centered(20, &COMPUTE_TEXT)),
        Text::new("MEMORY-BOUND", (4.0, 4.4), centered(20, &MEMORY_TEXT)),
    ])?;

    if let Some(fit) = model.trend {
        let line = upgrade_trend_line(&fit);
        chart.draw_series(LineSeries::new(
            line.iter().cloned(),
            TREND_BAND.mix(0.15).stroke_width(8),
        ))?;
        chart
            .draw_series(DashedLineSeries::new(line, 12, 8, TREND.stroke_width(3)))?
            .label(format!("Trend (R² = {:.2}, ρ = {:.2})", r2, rho))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], TREND.stroke_width(3)));
    }

    let color_of =
        |p: &UpgradePoint| lerp_color(&IMPROVEMENT_STOPS, linear_norm(p.improvement, 0.0, 4.5));
    chart.draw_series(model.points.iter().map(|p| {
        Circle::new((p.effective_miss, p.improvement), 30, color_of(p).mix(0.12).filled())
    }))?;
    chart.draw_series(model.points.iter().map(|p| {
        Circle::new((p.effective_miss, p.improvement), 24, color_of(p).mix(0.9).filled())
    }))?;
    chart.draw_series(model.points.iter().map(|p| {
        Circle::new((p.effective_miss, p.improvement), 24, WHITE.stroke_width(3))
    }))?;

    for point in &model.points {
        let (px, py) = chart.backend_coord(&(point.effective_miss, point.improvement));
        let (dx, dy) = upgrade_offset(point);
        let (text, fill, edge) = band_colors(point.band());
        let lines = [
            point.benchmark.short_name().to_string(),
            format!("{:.2}%", point.improvement),
        ];
        draw_badge(
            &root,
            (px + dx, py + dy),
            &Badge {
                lines: &lines,
                size: 18,
                text,
                fill,
                edge,
            },
        )?;
    }

    let subtitle = format!(
        "Strong correlation (ρ = {:.2}) · X-axis combines L1d & L2 miss rates",
        rho
    );
    let (cx, _) = chart.backend_coord(&(1.0, y_max));
    draw_text(&root, &subtitle, (cx, 80), 18, &SUBTITLE)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(font(18))
        .background_style(WHITE.mix(0.95))
        .border_style(DIVIDER)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{scaling_points, upgrade_points};
    use crate::catalog::Catalog;

    #[test]
    fn test_dual_axis_model() {
        let catalog = Catalog::default();
        let model = dual_axis_model(&catalog.baseline).unwrap();
        assert_eq!(model.labels, vec!["bzip2", "mcf", "hmmer", "sjeng", "lbm"]);
        assert!((model.cpi_max - 10.271 * 1.15).abs() < 1e-9);
        assert!((model.sim_max - 0.5135 * 1.15).abs() < 1e-9);
        assert!(dual_axis_model(&[]).is_none());
    }

    #[test]
    fn test_heatmap_model() {
        let catalog = Catalog::default();
        let model = heatmap_model(&catalog.baseline).unwrap();
        assert_eq!(model.values[0], [0.008, 1.48, 28.22]);
        assert_eq!(model.columns.len(), 3);
    }

    #[test]
    fn test_miss_colors() {
        assert_eq!(miss_color(0.0001), MISS_STOPS[0]);
        assert_eq!(miss_color(100.0), MISS_STOPS[4]);
        assert_eq!(miss_text_color(28.22), WHITE);
        assert_eq!(miss_text_color(1.48), BLACK);
    }

    #[test]
    fn test_scaling_model() {
        let model = scaling_model(&scaling_points(&Catalog::default()));
        assert!(model.trend.unwrap().slope < 0.0);
        assert!(model.correlation.unwrap() < 0.0);
        assert!(scaling_radius(16.70) > scaling_radius(1.19));
        assert_eq!(scaling_radius(0.0), 4);
    }

    #[test]
    fn test_upgrade_model() {
        let model = upgrade_model(&upgrade_points(&Catalog::default()));
        let fit = model.trend.unwrap();
        assert!(fit.slope > 0.0);
        let r2 = model.r_squared.unwrap();
        assert!((r2 - model.correlation.unwrap().powi(2)).abs() < 1e-12);

        let line = upgrade_trend_line(&fit);
        assert_eq!(line.len(), 200);
        assert!((line[0].0 - UPGRADE_X_MIN).abs() < 1e-12);
        assert!((line[199].0 - UPGRADE_X_MAX).abs() < 1e-9);
    }
}
