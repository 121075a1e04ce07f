//! Derived metrics of the baseline, clock and memory studies

use crate::catalog::{Benchmark, Catalog};
use crate::stats;

/// L2 miss rate (%) above which a benchmark counts as memory-bound
/// in the clock scaling study
pub const SCALING_MEMORY_BOUND_L2_PCT: f64 = 35.0;

/// Effective DRAM miss rate above which a benchmark counts as
/// memory-bound in the memory upgrade study
pub const UPGRADE_MEMORY_BOUND_EFFECTIVE: f64 = 0.5;

/// Ratio between the highest and lowest clock of the sweep
const CLOCK_RATIO: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Good,
    Moderate,
    Poor,
}

/// 1GHz to 4GHz scaling of one benchmark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalingPoint {
    pub benchmark: Benchmark,
    pub l2_miss_pct: f64,
    pub speedup: f64,
    /// Speedup relative to the 4x clock increase, in percent
    pub efficiency: f64,
    pub cpi_4ghz: f64,
}

impl ScalingPoint {
    pub fn band(&self) -> Band {
        efficiency_band(self.efficiency)
    }

    pub fn is_memory_bound(&self) -> bool {
        self.l2_miss_pct >= SCALING_MEMORY_BOUND_L2_PCT
    }
}

pub fn efficiency_band(efficiency: f64) -> Band {
    if efficiency >= 85.0 {
        Band::Good
    } else if efficiency >= 60.0 {
        Band::Moderate
    } else {
        Band::Poor
    }
}

/// Scaling points in baseline order; benchmarks without a clock sweep
/// are left out
pub fn scaling_points(catalog: &Catalog) -> Vec<ScalingPoint> {
    catalog
        .baseline
        .iter()
        .filter_map(|run| {
            let freq = catalog.frequency_of(run.benchmark)?;
            if freq.sim_4ghz <= 0.0 {
                log::warn!("{}: no 4GHz simulation time", run.benchmark);
                return None;
            }
            let speedup = freq.sim_1ghz / freq.sim_4ghz;
            Some(ScalingPoint {
                benchmark: run.benchmark,
                l2_miss_pct: run.l2_miss_pct,
                speedup,
                efficiency: speedup / CLOCK_RATIO * 100.0,
                cpi_4ghz: freq.cpi_4ghz,
            })
        })
        .collect()
}

/// Correlation between L2 miss rate and scaling efficiency
pub fn scaling_correlation(points: &[ScalingPoint]) -> Option<f64> {
    let xs: Vec<f64> = points.iter().map(|p| p.l2_miss_pct).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.efficiency).collect();
    stats::correlation(&xs, &ys)
}

/// Fraction of accesses that reach DRAM: `L1d% * L2% / 100`
pub fn effective_miss_rate(l1d_miss_pct: f64, l2_miss_pct: f64) -> f64 {
    l1d_miss_pct * l2_miss_pct / 100.0
}

/// Benefit of the DDR3_2133 upgrade for one benchmark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradePoint {
    pub benchmark: Benchmark,
    pub effective_miss: f64,
    /// Simulation time improvement in percent; equal to the CPI
    /// improvement since the instruction count is fixed
    pub improvement: f64,
}

impl UpgradePoint {
    pub fn band(&self) -> Band {
        if self.improvement < 0.3 {
            Band::Good
        } else if self.improvement < 1.5 {
            Band::Moderate
        } else {
            Band::Poor
        }
    }

    pub fn is_memory_bound(&self) -> bool {
        self.effective_miss >= UPGRADE_MEMORY_BOUND_EFFECTIVE
    }
}

/// Upgrade points sorted by effective miss rate, lowest first
pub fn upgrade_points(catalog: &Catalog) -> Vec<UpgradePoint> {
    let mut points: Vec<UpgradePoint> = catalog
        .memory_upgrade
        .iter()
        .filter_map(|run| {
            let base = catalog.baseline_of(run.benchmark)?;
            if run.cpi_ddr3_1600 <= 0.0 {
                log::warn!("{}: no DDR3_1600 CPI", run.benchmark);
                return None;
            }
            Some(UpgradePoint {
                benchmark: run.benchmark,
                effective_miss: effective_miss_rate(base.l1d_miss_pct, base.l2_miss_pct),
                improvement: (run.cpi_ddr3_1600 - run.cpi_ddr3_2133) / run.cpi_ddr3_1600
                    * 100.0,
            })
        })
        .collect();
    points.sort_by(|a, b| a.effective_miss.total_cmp(&b.effective_miss));
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_points() {
        let catalog = Catalog::default();
        let points = scaling_points(&catalog);
        assert_eq!(points.len(), 5);

        let hmmer = points
            .iter()
            .find(|p| p.benchmark == Benchmark::Hmmer)
            .unwrap();
        assert!((hmmer.speedup - 0.1185 / 0.0298).abs() < 1e-12);
        assert!(hmmer.efficiency > 99.0);
        assert_eq!(hmmer.band(), Band::Good);
        assert!(!hmmer.is_memory_bound());

        let sjeng = points
            .iter()
            .find(|p| p.benchmark == Benchmark::Sjeng)
            .unwrap();
        assert_eq!(sjeng.band(), Band::Poor);
        assert!(sjeng.is_memory_bound());
    }

    #[test]
    fn test_scaling_correlation_is_negative() {
        let points = scaling_points(&Catalog::default());
        let rho = scaling_correlation(&points).unwrap();
        assert!(rho < -0.8, "rho = {}", rho);
    }

    #[test]
    fn test_efficiency_band_edges() {
        assert_eq!(efficiency_band(85.0), Band::Good);
        assert_eq!(efficiency_band(84.9), Band::Moderate);
        assert_eq!(efficiency_band(60.0), Band::Moderate);
        assert_eq!(efficiency_band(59.9), Band::Poor);
    }

    #[test]
    fn test_upgrade_points_sorted() {
        let points = upgrade_points(&Catalog::default());
        let order: Vec<Benchmark> = points.iter().map(|p| p.benchmark).collect();
        assert_eq!(
            order,
            vec![
                Benchmark::Mcf,
                Benchmark::Hmmer,
                Benchmark::Bzip,
                Benchmark::Libm,
                Benchmark::Sjeng
            ]
        );

        let sjeng = points.last().unwrap();
        assert!((sjeng.effective_miss - 12.18 * 99.99 / 100.0).abs() < 1e-12);
        assert_eq!(sjeng.band(), Band::Poor);
        assert!(sjeng.is_memory_bound());
        assert_eq!(points[0].band(), Band::Good);
    }
}
