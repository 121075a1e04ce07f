//! Cost model charts

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use super::{
    benchmark_color, bold, centered, change_symbol, draw_badge, draw_text, font, kilo_label,
    kilo_tick, open, Badge, DANGER, DARK, DIVIDER, GRID, MUTED, NEUTRAL, SUCCESS,
};
use crate::catalog::Benchmark;
use crate::cost::{efficiency_change, pair_of, CostRecord};
use crate::error::{EvalError, EvalResult};
use crate::stats;

/// Constant CPI × cost values drawn as guide curves
pub const ISO_VALUES: [f64; 4] = [500.0, 2000.0, 5000.0, 15000.0];
const ISO_CPI_MIN: f64 = 0.5;
const ISO_CPI_MAX: f64 = 12.0;
const ISO_COST_MIN: f64 = 50.0;

/// Left out of the tradeoff chart; its move overlaps `hmmer`
const TRADEOFF_SKIPPED: Benchmark = Benchmark::Mcf;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TradeoffMove {
    pub benchmark: Benchmark,
    /// (cost, CPI) on the default configuration
    pub from: (f64, f64),
    /// (cost, CPI) on the optimised configuration
    pub to: (f64, f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IsoCurve {
    pub value: f64,
    pub points: Vec<(f64, f64)>,
}

impl IsoCurve {
    /// `CPI×Cost=2k`
    pub fn label(&self) -> String {
        if self.value < 1000.0 {
            format!("CPI×Cost={:.0}", self.value)
        } else {
            format!("CPI×Cost={:.0}k", (self.value / 1000.0).floor())
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TradeoffModel {
    pub moves: Vec<TradeoffMove>,
    pub curves: Vec<IsoCurve>,
    pub x_max: f64,
}

pub fn iso_curve(value: f64, x_max: f64) -> Option<IsoCurve> {
    let points: Vec<(f64, f64)> = stats::linspace(ISO_COST_MIN, x_max, 100)
        .into_iter()
        .map(|c| (c, value / c))
        .filter(|(_, cpi)| (ISO_CPI_MIN..=ISO_CPI_MAX).contains(cpi))
        .collect();
    if points.is_empty() {
        None
    } else {
        Some(IsoCurve { value, points })
    }
}

/// Moves in `order`, with the x limit 30% past the costliest record
pub fn tradeoff_model(records: &[CostRecord], order: &[Benchmark]) -> Option<TradeoffModel> {
    let max_cost = records.iter().map(|r| r.cost).fold(0.0, f64::max);
    if max_cost <= 0.0 {
        return None;
    }
    let x_max = max_cost * 1.3;
    let moves = order
        .iter()
        .filter(|b| **b != TRADEOFF_SKIPPED)
        .filter_map(|b| {
            let (default, optimized) = pair_of(records, *b)?;
            Some(TradeoffMove {
                benchmark: *b,
                from: (default.cost, default.cpi),
                to: (optimized.cost, optimized.cpi),
            })
        })
        .collect();
    let curves = ISO_VALUES
        .iter()
        .filter_map(|v| iso_curve(*v, x_max))
        .collect();
    Some(TradeoffModel {
        moves,
        curves,
        x_max,
    })
}

/// Arrowhead triangle at `tip`, pointing away from `tail`
fn arrow_head(tail: (i32, i32), tip: (i32, i32), size: f64) -> Vec<(i32, i32)> {
    let (dx, dy) = ((tip.0 - tail.0) as f64, (tip.1 - tail.1) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return Vec::new();
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = (tip.0 as f64 - ux * size, tip.1 as f64 - uy * size);
    let half = size * 0.5;
    vec![
        tip,
        ((base.0 - uy * half) as i32, (base.1 + ux * half) as i32),
        ((base.0 + uy * half) as i32, (base.1 - ux * half) as i32),
    ]
}

pub fn draw_tradeoff(path: &Path, model: &TradeoffModel) -> EvalResult<()> {
    let root = open(path, (1800, 1300))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cost vs Performance Trade-off", bold(36).color(&DARK))
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(0.0..model.x_max, 0.0..ISO_CPI_MAX)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(GRID.mix(0.2))
        .x_desc("Hardware Cost (Area Cost Units)")
        .y_desc("CPI (Cycles Per Instruction)")
        .axis_desc_style(bold(26).color(&DARK))
        .label_style(font(18))
        .draw()?;

    let (px, py) = chart.backend_coord(&(model.x_max / 2.0, ISO_CPI_MAX));
    draw_text(
        &root,
        "C = (S_L1·γ_L1 + S_L2·γ_L2) + Σ S_i/CL·(T_w + σ)",
        (px, py - 16),
        20,
        &MUTED,
    )?;

    for curve in &model.curves {
        chart.draw_series(DashedLineSeries::new(
            curve.points.iter().cloned(),
            10,
            6,
            GRID.mix(0.6).stroke_width(2),
        ))?;
        let at = curve.points[curve.points.len() / 3];
        chart.draw_series([Text::new(
            curve.label(),
            at,
            font(16).color(&MUTED),
        )])?;
    }

    for mv in &model.moves {
        let color = benchmark_color(mv.benchmark);
        chart.draw_series(LineSeries::new(
            [mv.from, mv.to],
            color.mix(0.7).stroke_width(4),
        ))?;
        let head = arrow_head(
            chart.backend_coord(&mv.from),
            chart.backend_coord(&mv.to),
            22.0,
        );
        if !head.is_empty() {
            root.draw(&Polygon::new(head, color.mix(0.7).filled()))?;
        }

        chart.draw_series([
            Circle::new(mv.from, 16, WHITE.filled()),
            Circle::new(mv.to, 18, color.filled()),
        ])?;
        chart.draw_series([
            Circle::new(mv.from, 16, color.stroke_width(4)),
            Circle::new(mv.to, 18, WHITE.stroke_width(3)),
        ])?;

        let (lx, ly) = chart.backend_coord(&mv.to);
        draw_badge(
            &root,
            (lx + 70, ly - 36),
            &Badge {
                lines: &[mv.benchmark.label()],
                size: 20,
                text: DARK,
                fill: WHITE,
                edge: color,
            },
        )?;
    }

    // Legend
    let (lx, ly) = chart.backend_coord(&(model.x_max, ISO_CPI_MAX));
    let (lx, ly) = (lx - 330, ly + 30);
    root.draw(&Rectangle::new(
        [(lx - 20, ly - 24), (lx + 300, ly + 76)],
        WHITE.mix(0.95).filled(),
    ))?;
    root.draw(&Rectangle::new(
        [(lx - 20, ly - 24), (lx + 300, ly + 76)],
        DIVIDER.stroke_width(2),
    ))?;
    root.draw(&Circle::new((lx, ly), 12, DARK.stroke_width(3)))?;
    root.draw(&Circle::new((lx, ly + 50), 13, DARK.filled()))?;
    let legend_font = font(20).color(&DARK);
    root.draw(&Text::new("Default Configuration", (lx + 26, ly - 10), legend_font.clone()))?;
    root.draw(&Text::new("Optimized Configuration", (lx + 26, ly + 40), legend_font))?;

    root.present()?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EfficiencyBar {
    pub benchmark: Benchmark,
    pub default_cp: f64,
    pub optimized_cp: f64,
    /// Relative drop of CPI × cost in percent
    pub change: f64,
}

pub fn efficiency_bars(records: &[CostRecord], order: &[Benchmark]) -> Vec<EfficiencyBar> {
    order
        .iter()
        .filter_map(|b| {
            let (default, optimized) = pair_of(records, *b)?;
            Some(EfficiencyBar {
                benchmark: *b,
                default_cp: default.cost_performance,
                optimized_cp: optimized.cost_performance,
                change: efficiency_change(default, optimized),
            })
        })
        .collect()
}

/// `▼ 12%` for a reduction, `▲ 3%` for a growth
pub fn change_badge(change: f64) -> String {
    format!("{} {:.0}%", change_symbol(change), change.abs())
}

pub fn draw_efficiency(path: &Path, bars: &[EfficiencyBar]) -> EvalResult<()> {
    let y_max = bars.iter().map(|b| b.default_cp).fold(0.0, f64::max) * 1.2;
    if bars.is_empty() || y_max <= 0.0 {
        return Err(EvalError::NoData("no cost records".to_string()));
    }
    let root = open(path, (1800, 1050))?;
    let n = bars.len() as f64;
    let width = 0.35;
    // Label offsets in data units
    let label_gap = y_max * 0.02;
    let badge_gap = y_max * 0.07;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Cost-Efficiency Comparison (Additive Physical Cost Model)",
            bold(34).color(&DARK),
        )
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(120)
        .build_cartesian_2d(-0.6..n - 0.4, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(GRID.mix(0.15))
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|v| kilo_tick(*v))
        .x_desc("Benchmark")
        .y_desc("Cost × CPI (Lower = Better)")
        .axis_desc_style(bold(24).color(&DARK))
        .label_style(font(18))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().flat_map(|(i, bar)| {
        let x = i as f64;
        let color = benchmark_color(bar.benchmark);
        [
            Rectangle::new([(x - width, 0.0), (x, bar.default_cp)], NEUTRAL.filled()),
            Rectangle::new([(x, 0.0), (x + width, bar.optimized_cp)], color.filled()),
        ]
    }))?;
    chart.draw_series(bars.iter().enumerate().flat_map(|(i, bar)| {
        let x = i as f64;
        [
            Rectangle::new([(x - width, 0.0), (x, bar.default_cp)], WHITE.stroke_width(2)),
            Rectangle::new([(x, 0.0), (x + width, bar.optimized_cp)], WHITE.stroke_width(2)),
        ]
    }))?;
    chart.draw_series(bars.iter().enumerate().flat_map(|(i, bar)| {
        let x = i as f64;
        [
            EmptyElement::at((x - width / 2.0, bar.default_cp + label_gap))
                + Text::new(kilo_label(bar.default_cp), (0, -6), centered(16, &MUTED)),
            EmptyElement::at((x + width / 2.0, bar.optimized_cp + label_gap))
                + Text::new(kilo_label(bar.optimized_cp), (0, -6), centered(16, &DARK)),
        ]
    }))?;

    for (i, bar) in bars.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, 0.0));
        draw_text(&root, &bar.benchmark.label(), (px, py + 24), 22, &DARK)?;

        let top = bar.default_cp.max(bar.optimized_cp) + badge_gap;
        let (bx, by) = chart.backend_coord(&(i as f64, top));
        draw_badge(
            &root,
            (bx, by),
            &Badge {
                lines: &[change_badge(bar.change)],
                size: 18,
                text: WHITE,
                fill: if bar.change > 0.0 { SUCCESS } else { DANGER },
                edge: WHITE,
            },
        )?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::cost::{analyze, CostParams};

    fn default_records() -> (Catalog, Vec<CostRecord>) {
        let catalog = Catalog::default();
        let records = analyze(&catalog, &CostParams::default());
        (catalog, records)
    }

    fn order(catalog: &Catalog) -> Vec<Benchmark> {
        catalog.optimized.iter().map(|o| o.benchmark).collect()
    }

    #[test]
    fn test_iso_curve_bounds() {
        let curve = iso_curve(2000.0, 10000.0).unwrap();
        assert!(curve
            .points
            .iter()
            .all(|(_, cpi)| (0.5..=12.0).contains(cpi)));
        assert!(curve.points.iter().all(|(c, cpi)| (c * cpi - 2000.0).abs() < 1e-6));
        assert_eq!(curve.label(), "CPI×Cost=2k");

        // 10 / 50 is already under the CPI floor
        assert!(iso_curve(10.0, 1000.0).is_none());
        assert_eq!(iso_curve(500.0, 1000.0).unwrap().label(), "CPI×Cost=500");
    }

    #[test]
    fn test_tradeoff_model() {
        let (catalog, records) = default_records();
        let model = tradeoff_model(&records, &order(&catalog)).unwrap();

        assert_eq!(model.moves.len(), 4);
        assert!(model.moves.iter().all(|m| m.benchmark != Benchmark::Mcf));
        let max_cost = records.iter().map(|r| r.cost).fold(0.0, f64::max);
        assert!((model.x_max - max_cost * 1.3).abs() < 1e-9);
        assert_eq!(model.curves.len(), ISO_VALUES.len());

        let sjeng = model
            .moves
            .iter()
            .find(|m| m.benchmark == Benchmark::Sjeng)
            .unwrap();
        assert_eq!(sjeng.from.1, 10.271);
        assert_eq!(sjeng.to.1, 3.072);

        assert!(tradeoff_model(&[], &order(&catalog)).is_none());
    }

    #[test]
    fn test_efficiency_bars() {
        let (catalog, records) = default_records();
        let bars = efficiency_bars(&records, &order(&catalog));
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[0].benchmark, Benchmark::Hmmer);
        for bar in &bars {
            let expected = (bar.default_cp - bar.optimized_cp) / bar.default_cp * 100.0;
            assert!((bar.change - expected).abs() < 1e-9);
        }
        let libm = bars.iter().find(|b| b.benchmark == Benchmark::Libm).unwrap();
        assert!(libm.change > 0.0);
        assert_eq!(kilo_label(libm.optimized_cp), "0.3k");
        assert_eq!(kilo_label(bars[0].optimized_cp), "0.9k");
    }

    #[test]
    fn test_change_badge() {
        assert_eq!(change_badge(41.6), "▼ 42%");
        assert_eq!(change_badge(-12.2), "▲ 12%");
    }

    #[test]
    fn test_arrow_head() {
        let head = arrow_head((0, 0), (100, 0), 20.0);
        assert_eq!(head, vec![(100, 0), (80, 10), (80, -10)]);
        assert!(arrow_head((5, 5), (5, 5), 20.0).is_empty());
    }
}
