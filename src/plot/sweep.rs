//! Design-space sweep charts

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use super::{
    benchmark_color, bold, centered, draw_badge, draw_text, font, open, Badge, BEST,
    COMPUTE_TEXT, COMPUTE_ZONE, DANGER, DARK, DIVIDER, GRID, MEMORY_TEXT, MEMORY_ZONE, MUTED,
    NEUTRAL, SUCCESS, TREND, TREND_BAND,
};
use crate::error::{EvalError, EvalResult};
use crate::results::{
    workload_trend, Impact, Progression, WorkloadPoint, MEMORY_BOUND_L2_PCT, TREND_BAND as BAND,
};
use crate::stats::{self, LinearFit};

/// y range of a progression chart: 15% below the best CPI and 20% above
/// the worst; a flat series still gets a visible range
pub fn progression_y_range(progression: &Progression) -> (f64, f64) {
    let (worst, best) = (progression.worst(), progression.best());
    let span = worst - best;
    if span > 0.0 {
        (best - span * 0.15, worst + span * 0.2)
    } else {
        let pad = (worst.abs() * 0.1).max(0.1);
        (best - pad, worst + pad)
    }
}

pub fn draw_progression(path: &Path, progression: &Progression) -> EvalResult<()> {
    let n = progression.points.len();
    if n == 0 {
        return Err(EvalError::NoData(format!(
            "{}: no configurations",
            progression.benchmark
        )));
    }
    let root = open(path, (1800, 1200))?;
    let color = benchmark_color(progression.benchmark);
    let (y_min, y_max) = progression_y_range(progression);
    let last = (n - 1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} — CPI Optimization Journey", progression.benchmark.label()),
            bold(36).color(&DARK),
        )
        .margin(30)
        .x_label_area_size(220)
        .y_label_area_size(100)
        .build_cartesian_2d(-0.7..last + 0.7, y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(GRID.mix(0.3))
        .x_label_formatter(&|_| String::new())
        .x_desc("Configuration (sorted by CPI: worst → best)")
        .y_desc("CPI (Cycles Per Instruction)")
        .axis_desc_style(bold(24).color(&DARK))
        .label_style(font(18))
        .draw()?;

    let points: Vec<(f64, f64)> = progression
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, cpi))| (i as f64, *cpi))
        .collect();

    chart.draw_series(AreaSeries::new(points.iter().cloned(), y_min, color.mix(0.1)))?;
    chart.draw_series(LineSeries::new(
        points.iter().cloned(),
        BLACK.mix(0.08).stroke_width(9),
    ))?;
    chart.draw_series(LineSeries::new(
        points.iter().cloned(),
        color.mix(0.9).stroke_width(6),
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new(*p, 14, color.mix(0.2).filled())),
    )?;
    chart.draw_series(points.iter().map(|p| Circle::new(*p, 10, color.filled())))?;
    chart.draw_series(points.iter().map(|p| Circle::new(*p, 10, WHITE.stroke_width(3))))?;

    // Worst (first) and best (last) configurations
    let worst = points[0];
    let best = points[n - 1];
    chart.draw_series([
        Circle::new(best, 26, BEST.mix(0.2).filled()),
        Circle::new(worst, 24, DANGER.mix(0.2).filled()),
    ])?;
    chart.draw_series([TriangleMarker::new(best, 18, BEST.filled())])?;
    chart.draw_series([Cross::new(worst, 14, DANGER.stroke_width(5))])?;

    if let Some(baseline) = progression.baseline_cpi {
        chart.draw_series(DashedLineSeries::new(
            vec![(-0.3, baseline), (last + 0.3, baseline)],
            12,
            8,
            MUTED.stroke_width(3),
        ))?;
        let (px, py) = chart.backend_coord(&(last + 0.3, baseline));
        draw_text(&root, &format!("Baseline {:.2}", baseline), (px - 60, py - 20), 18, &MUTED)?;
    }

    // Rotated configuration names under each point
    let (_, bottom) = chart.backend_coord(&(0.0, y_min));
    for (i, (label, _)) in progression.points.iter().enumerate() {
        let (px, _) = chart.backend_coord(&(i as f64, y_min));
        root.draw(&Text::new(
            label.as_str(),
            (px - 8, bottom + 12),
            font(16).transform(FontTransform::Rotate90).color(&DARK),
        ))?;
    }

    let span = worst.1 - best.1;
    let (bx, by) = chart.backend_coord(&(best.0, best.1 + span * 0.12));
    draw_badge(
        &root,
        (bx - 60, by),
        &Badge {
            lines: &[format!("✓ Best: {:.2}", best.1)],
            size: 22,
            text: WHITE,
            fill: BEST,
            edge: RGBColor(0x16, 0xA0, 0x85),
        },
    )?;
    let (wx, wy) = chart.backend_coord(&(worst.0, worst.1));
    draw_badge(
        &root,
        (wx + 150, wy + 10),
        &Badge {
            lines: &[format!("✗ Baseline: {:.2}", worst.1)],
            size: 22,
            text: WHITE,
            fill: DANGER,
            edge: RGBColor(0xC0, 0x39, 0x2B),
        },
    )?;

    let (rx, ty) = chart.backend_coord(&(last + 0.7, y_max));
    draw_badge(
        &root,
        (rx - 110, ty + 50),
        &Badge {
            lines: &[
                format!("▼ {:.1}%", progression.improvement()),
                "Improvement".to_string(),
            ],
            size: 20,
            text: WHITE,
            fill: SUCCESS,
            edge: RGBColor(0x1E, 0x84, 0x49),
        },
    )?;

    root.present()?;
    Ok(())
}

/// y limit of the impact chart: 25% over the highest baseline
pub fn impact_y_max(impacts: &[Impact]) -> f64 {
    let max = impacts
        .iter()
        .map(|i| i.baseline_cpi)
        .fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.25
    } else {
        1.0
    }
}

pub fn draw_impact(path: &Path, impacts: &[Impact]) -> EvalResult<()> {
    if impacts.is_empty() {
        return Err(EvalError::NoData("no benchmark results".to_string()));
    }
    let root = open(path, (1800, 1000))?;
    let n = impacts.len() as f64;
    let width = 0.38;
    let y_max = impact_y_max(impacts);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Optimization Impact: Baseline vs Best Configuration",
            bold(34).color(&DARK),
        )
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(-0.6..n - 0.4, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(GRID.mix(0.3))
        .x_label_formatter(&|_| String::new())
        .x_desc("Benchmark")
        .y_desc("CPI (Cycles Per Instruction)")
        .axis_desc_style(bold(24).color(&DARK))
        .label_style(font(18))
        .draw()?;

    // Drop shadows, then the bars
    chart.draw_series(impacts.iter().enumerate().flat_map(|(i, imp)| {
        let x = i as f64 + 0.02;
        [
            Rectangle::new([(x - width, 0.0), (x, imp.baseline_cpi)], BLACK.mix(0.05).filled()),
            Rectangle::new([(x, 0.0), (x + width, imp.best_cpi)], BLACK.mix(0.05).filled()),
        ]
    }))?;
    chart
        .draw_series(impacts.iter().enumerate().map(|(i, imp)| {
            let x = i as f64;
            Rectangle::new([(x - width, 0.0), (x, imp.baseline_cpi)], NEUTRAL.mix(0.9).filled())
        }))?
        .label("Baseline (Default)")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], NEUTRAL.filled()));
    chart
        .draw_series(impacts.iter().enumerate().map(|(i, imp)| {
            let x = i as f64;
            let color = benchmark_color(imp.benchmark);
            Rectangle::new([(x, 0.0), (x + width, imp.best_cpi)], color.mix(0.9).filled())
        }))?
        .label("Optimized")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], DARK.filled()));

    chart.draw_series(impacts.iter().enumerate().flat_map(|(i, imp)| {
        let x = i as f64;
        [
            EmptyElement::at((x - width / 2.0, imp.baseline_cpi))
                + Text::new(
                    format!("{:.2}", imp.baseline_cpi),
                    (0, -14),
                    centered(18, &MUTED),
                ),
            EmptyElement::at((x + width / 2.0, imp.best_cpi))
                + Text::new(format!("{:.2}", imp.best_cpi), (0, -14), centered(18, &DARK)),
        ]
    }))?;

    for (i, imp) in impacts.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, 0.0));
        draw_text(&root, &imp.benchmark.label(), (px, py + 24), 22, &DARK)?;

        if let Some(improvement) = imp.improvement() {
            let (bx, by) = chart.backend_coord(&(i as f64, imp.baseline_cpi + y_max * 0.06));
            draw_badge(
                &root,
                (bx, by),
                &Badge {
                    lines: &[format!("▼ {:.1}%", improvement)],
                    size: 20,
                    text: WHITE,
                    fill: SUCCESS,
                    edge: WHITE,
                },
            )?;
        }
    }

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

/// Workload classification with its trend line and axis limits
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadModel {
    pub points: Vec<WorkloadPoint>,
    pub trend: Option<LinearFit>,
    pub correlation: Option<f64>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

pub fn workload_model(points: &[WorkloadPoint]) -> Option<WorkloadModel> {
    if points.is_empty() {
        return None;
    }
    let max_miss = points.iter().map(|p| p.l2_miss_pct).fold(f64::MIN, f64::max);
    let max_imp = points.iter().map(|p| p.improvement).fold(f64::MIN, f64::max);
    let (trend, correlation) = match workload_trend(points) {
        Some((fit, rho)) => (Some(fit), rho),
        None => (None, None),
    };
    Some(WorkloadModel {
        points: points.to_vec(),
        trend,
        correlation,
        x_range: (-5.0, max_miss + 15.0),
        y_range: (-5.0, max_imp + 15.0),
    })
}

pub fn draw_workload(path: &Path, model: &WorkloadModel) -> EvalResult<()> {
    let root = open(path, (1600, 1200))?;
    let (x_min, x_max) = model.x_range;
    let (y_min, y_max) = model.y_range;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Workload Classification: Memory-Bound vs Compute-Bound",
            bold(34).color(&DARK),
        )
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(GRID.mix(0.3))
        .x_desc("Baseline L2 Miss Rate (%)")
        .y_desc("CPI Improvement (%)")
        .axis_desc_style(bold(26).color(&DARK))
        .label_style(font(18))
        .draw()?;

    let split = MEMORY_BOUND_L2_PCT;
    let zone_top = y_max - 10.0;
    chart.draw_series([
        Rectangle::new([(0.0, 0.0), (split, zone_top)], COMPUTE_ZONE.mix(0.12).filled()),
        Rectangle::new(
            [(split, 0.0), (split + 60.0, zone_top)],
            MEMORY_ZONE.mix(0.12).filled(),
        ),
    ])?;
    chart.draw_series([
        Text::new("COMPUTE-BOUND", (split / 2.0, zone_top - 3.0), centered(20, &COMPUTE_TEXT)),
        Text::new(
            "MEMORY-BOUND",
            (split + 30.0, zone_top - 3.0),
            centered(20, &MEMORY_TEXT),
        ),
    ])?;
    chart.draw_series(DashedLineSeries::new(
        vec![(split, y_min), (split, y_max)],
        10,
        6,
        DIVIDER.stroke_width(2),
    ))?;

    if let Some(fit) = model.trend {
        let max_miss = model
            .points
            .iter()
            .map(|p| p.l2_miss_pct)
            .fold(0.0, f64::max);
        let xs = stats::linspace(0.0, max_miss + 5.0, 100);
        let upper: Vec<(f64, f64)> = xs.iter().map(|x| (*x, fit.eval(*x) + BAND)).collect();
        let lower: Vec<(f64, f64)> = xs.iter().rev().map(|x| (*x, fit.eval(*x) - BAND)).collect();
        chart.draw_series(std::iter::once(Polygon::new(
            upper.into_iter().chain(lower).collect::<Vec<_>>(),
            TREND_BAND.mix(0.1).filled(),
        )))?;

        let rho = model.correlation.unwrap_or(f64::NAN);
        chart
            .draw_series(LineSeries::new(
                xs.iter().map(|x| (*x, fit.eval(*x))),
                TREND.mix(0.8).stroke_width(4),
            ))?
            .label(format!("Trend (ρ = {:.2})", rho))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], TREND.stroke_width(4)));
    }

    for point in &model.points {
        let color = benchmark_color(point.benchmark);
        let at = (point.l2_miss_pct, point.improvement);
        chart.draw_series([
            Circle::new(at, 28, color.mix(0.15).filled()),
            Circle::new(at, 22, color.mix(0.9).filled()),
        ])?;
        chart.draw_series([Circle::new(at, 22, WHITE.stroke_width(3))])?;

        let (px, py) = chart.backend_coord(&at);
        draw_badge(
            &root,
            (px + 70, py - 30),
            &Badge {
                lines: &[point.benchmark.label()],
                size: 20,
                text: DARK,
                fill: WHITE,
                edge: color,
            },
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(font(20))
        .background_style(WHITE.mix(0.95))
        .border_style(DIVIDER)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Benchmark;

    fn progression(points: &[f64]) -> Progression {
        Progression {
            benchmark: Benchmark::Sjeng,
            points: points
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("cfg{}", i + 1), *v))
                .collect(),
            baseline_cpi: points.first().copied(),
        }
    }

    #[test]
    fn test_progression_y_range() {
        let (lo, hi) = progression_y_range(&progression(&[10.0, 6.0, 2.0]));
        assert!((lo - 0.8).abs() < 1e-9);
        assert!((hi - 11.6).abs() < 1e-9);

        let (lo, hi) = progression_y_range(&progression(&[3.0]));
        assert!(lo < 3.0 && hi > 3.0);
    }

    #[test]
    fn test_impact_y_max() {
        let impacts = [
            Impact {
                benchmark: Benchmark::Sjeng,
                baseline_cpi: 10.0,
                best_cpi: 3.0,
            },
            Impact {
                benchmark: Benchmark::Mcf,
                baseline_cpi: 1.3,
                best_cpi: 1.1,
            },
        ];
        assert_eq!(impact_y_max(&impacts), 12.5);
        assert_eq!(impact_y_max(&[]), 1.0);
    }

    #[test]
    fn test_workload_model() {
        let points = [
            WorkloadPoint {
                benchmark: Benchmark::Hmmer,
                l2_miss_pct: 7.8,
                improvement: 1.0,
            },
            WorkloadPoint {
                benchmark: Benchmark::Sjeng,
                l2_miss_pct: 99.99,
                improvement: 70.0,
            },
        ];
        let model = workload_model(&points).unwrap();
        assert!((model.x_range.1 - 114.99).abs() < 1e-9);
        assert_eq!(model.y_range, (-5.0, 85.0));
        assert!(model.trend.is_some());

        let single = workload_model(&points[..1]).unwrap();
        assert!(single.trend.is_none());
        assert!(workload_model(&[]).is_none());
    }
}
