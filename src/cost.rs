//! Additive physical cost model of a cache hierarchy
//!
//! `C = C_data + C_tag`, where
//!
//! - `C_data = S_L1 * γ_L1 + S_L2 * γ_L2` (KB of data array)
//! - `C_tag  = Σ (S_i / CL) * (T_w + σ) * γ_i * (1 + δ * W_i)`, converted
//!   from bits into KB-equivalent units
//!
//! `T_w` is the tag width of a level and `σ` its status bits per line
//! (valid, dirty and LRU). Costs are in area units, so larger lines shrink
//! the tag array while higher associativity grows the comparator logic.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cache::{get_log_2, CacheConfig, CacheGeometry, CacheLevel};
use crate::catalog::{Benchmark, Catalog};
use crate::error::EvalResult;

/// Bits in one KB-equivalent unit of cost
const BITS_PER_KB: f64 = 8.0 * 1024.0;

/// Constants of the cost model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostParams {
    /// L1 cell density factor (8T SRAM, about twice a 6T cell)
    pub gamma_l1: f64,
    /// L2 cell density factor (6T SRAM baseline)
    pub gamma_l2: f64,
    /// Physical address width in bits
    pub addr_width: u32,
    /// Logic overhead per way
    pub delta: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            gamma_l1: 2.0,
            gamma_l2: 1.0,
            addr_width: 32,
            delta: 0.05,
        }
    }
}

impl CostParams {
    pub fn gamma(&self, level: CacheLevel) -> f64 {
        if level.is_l1() {
            self.gamma_l1
        } else {
            self.gamma_l2
        }
    }
}

/// Tag width in bits: `addr_width - log2(CL) - log2(sets)`, at least 1
pub fn tag_width(size_kb: u32, cacheline_b: u32, assoc: u32, addr_width: u32) -> u32 {
    let geometry = CacheGeometry::make(size_kb, assoc);
    let num_sets = geometry.num_sets(cacheline_b);

    let offset_bits = if cacheline_b > 0 {
        get_log_2(cacheline_b) as i64
    } else {
        0
    };
    let index_bits = if num_sets > 1 {
        63 - num_sets.leading_zeros() as i64
    } else {
        0
    };

    (addr_width as i64 - offset_bits - index_bits).max(1) as u32
}

/// Status bits per line: valid + dirty + LRU
pub fn status_bits(assoc: u32) -> u32 {
    let lru_bits = if assoc > 1 {
        get_log_2(assoc - 1) + 1
    } else {
        0
    };
    2 + lru_bits
}

/// Tag and logic overhead of one level, in KB-equivalent units
pub fn level_overhead(
    level: CacheLevel,
    geometry: CacheGeometry,
    cacheline_b: u32,
    params: &CostParams,
) -> f64 {
    if cacheline_b == 0 {
        return 0.0;
    }
    let assoc = geometry.associativity;
    let tag_w = tag_width(geometry.size_kb, cacheline_b, assoc, params.addr_width);
    let status = status_bits(assoc);
    let num_lines = geometry.size_bytes() as f64 / cacheline_b as f64;

    let bits = num_lines
        * (tag_w + status) as f64
        * params.gamma(level)
        * (1.0 + params.delta * assoc as f64);
    bits / BITS_PER_KB
}

/// Data array cost: `S_L1 * γ_L1 + S_L2 * γ_L2`
pub fn data_cost(config: &CacheConfig, params: &CostParams) -> f64 {
    config.l1_total_kb() as f64 * params.gamma_l1 + config.l2.size_kb as f64 * params.gamma_l2
}

/// Total hardware cost, rounded to one decimal
pub fn cost(config: &CacheConfig, params: &CostParams) -> f64 {
    let overhead: f64 = config
        .levels()
        .into_iter()
        .map(|(level, geometry)| level_overhead(level, geometry, config.cacheline_b, params))
        .sum();
    round1(data_cost(config, params) + overhead)
}

/// Rounds to one decimal place. Ties on the exact binary value go to the
/// even digit; values just off a tie go to their side.
pub fn round1(value: f64) -> f64 {
    let scaled = value * 10.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        // Exact error of the product
        let err = value.mul_add(10.0, -scaled);
        if err > 0.0 || (err == 0.0 && floor % 2.0 != 0.0) {
            floor + 1.0
        } else {
            floor
        }
    } else {
        scaled.round()
    };
    rounded / 10.0
}

/// Cost split used for display, with the tag overhead estimated by the
/// proxy `S_total * (A_w / CL) * (1 + δ * W̄)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostBreakdown {
    pub c_data_l1: f64,
    pub c_data_l2: f64,
    pub c_data: f64,
    pub tag_overhead: f64,
    pub avg_ways: f64,
    pub cacheline: u32,
    pub total: f64,
}

pub fn cost_breakdown(config: &CacheConfig, params: &CostParams) -> CostBreakdown {
    let c_data_l1 = config.l1_total_kb() as f64 * params.gamma_l1;
    let c_data_l2 = config.l2.size_kb as f64 * params.gamma_l2;
    let c_data = c_data_l1 + c_data_l2;

    let avg_ways = config.mean_associativity();
    let tag_overhead = if config.cacheline_b == 0 {
        0.0
    } else {
        config.total_kb() as f64
            * (params.addr_width as f64 / config.cacheline_b as f64)
            * (1.0 + params.delta * avg_ways)
    };

    CostBreakdown {
        c_data_l1,
        c_data_l2,
        c_data,
        tag_overhead,
        avg_ways,
        cacheline: config.cacheline_b,
        total: c_data + tag_overhead,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConfigKind {
    Default,
    Optimized,
}

/// Cost and performance of one benchmark on one configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostRecord {
    #[serde(serialize_with = "serialize_benchmark")]
    pub benchmark: Benchmark,
    pub config_type: ConfigKind,
    pub cpi: f64,
    pub cost: f64,
    /// CPI × cost, lower is better
    pub cost_performance: f64,
    #[serde(rename = "L1_total_KB")]
    pub l1_total_kb: u32,
    #[serde(rename = "L2_KB")]
    pub l2_kb: u32,
    #[serde(rename = "cacheline_B")]
    pub cacheline_b: u32,
}

fn serialize_benchmark<S: serde::Serializer>(b: &Benchmark, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(b.id())
}

impl CostRecord {
    pub fn make(
        benchmark: Benchmark,
        config_type: ConfigKind,
        config: &CacheConfig,
        cpi: f64,
        params: &CostParams,
    ) -> Self {
        let cost = cost(config, params);
        Self {
            benchmark,
            config_type,
            cpi,
            cost,
            cost_performance: cpi * cost,
            l1_total_kb: config.l1_total_kb(),
            l2_kb: config.l2.size_kb,
            cacheline_b: config.cacheline_b,
        }
    }
}

/// Default records for every benchmark, followed by optimised ones
pub fn analyze(catalog: &Catalog, params: &CostParams) -> Vec<CostRecord> {
    let mut records: Vec<CostRecord> = catalog
        .default_cpis
        .iter()
        .map(|(benchmark, cpi)| {
            CostRecord::make(
                *benchmark,
                ConfigKind::Default,
                &catalog.default_config,
                *cpi,
                params,
            )
        })
        .collect();

    records.extend(catalog.optimized.iter().map(|opt| {
        CostRecord::make(
            opt.benchmark,
            ConfigKind::Optimized,
            &opt.config,
            opt.cpi,
            params,
        )
    }));
    records
}

/// Default and optimised records of one benchmark
pub fn pair_of(
    records: &[CostRecord],
    benchmark: Benchmark,
) -> Option<(&CostRecord, &CostRecord)> {
    let find = |kind: ConfigKind| {
        records
            .iter()
            .find(|r| r.benchmark == benchmark && r.config_type == kind)
    };
    Some((find(ConfigKind::Default)?, find(ConfigKind::Optimized)?))
}

/// Relative drop of CPI × cost in percent; positive means more efficient
pub fn efficiency_change(default: &CostRecord, optimized: &CostRecord) -> f64 {
    (default.cost_performance - optimized.cost_performance) / default.cost_performance * 100.0
}

/// Optimised record with the lowest CPI × cost
pub fn best_optimized(records: &[CostRecord]) -> Option<&CostRecord> {
    records
        .iter()
        .filter(|r| r.config_type == ConfigKind::Optimized)
        .min_by(|a, b| a.cost_performance.total_cmp(&b.cost_performance))
}

/// Prints the default/optimised comparison table
pub fn write_table<W: Write>(
    out: &mut W,
    records: &[CostRecord],
    order: &[Benchmark],
) -> std::io::Result<()> {
    let rule = "=".repeat(100);
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "COST-PERFORMANCE ANALYSIS (Additive Model: C = (L1*γ_L1 + L2*γ_L2) + Tag_overhead)"
    )?;
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "\n{:<12} {:<10} {:>8} {:>10} {:>12} {:>14}",
        "Benchmark", "Config", "CPI", "Cost", "CPI*Cost", "Δ Efficiency"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;

    for benchmark in order {
        let Some((default, optimized)) = pair_of(records, *benchmark) else {
            continue;
        };
        writeln!(
            out,
            "{:<12} {:<10} {:>8.3} {:>10.0} {:>12.0}",
            benchmark.id(),
            "Default",
            default.cpi,
            default.cost,
            default.cost_performance
        )?;
        writeln!(
            out,
            "{:<12} {:<10} {:>8.3} {:>10.0} {:>12.0} {:>+13.1}%",
            "",
            "Optimized",
            optimized.cpi,
            optimized.cost,
            optimized.cost_performance,
            efficiency_change(default, optimized)
        )?;
        writeln!(out)?;
    }
    writeln!(out, "{}", rule)?;

    if let Some(best) = best_optimized(records) {
        writeln!(out, "\nBEST COST-EFFICIENCY: {}", best.benchmark.label())?;
        writeln!(
            out,
            "   CPI*Cost = {:.0} (CPI={:.3}, Cost={:.0})",
            best.cost_performance, best.cpi, best.cost
        )?;
    }
    Ok(())
}

/// Writes every record as one CSV row
pub fn write_csv(path: &Path, records: &[CostRecord]) -> EvalResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_tag_width() {
        // 32KB, 64B lines, 2-way: 256 sets, 6 offset + 8 index bits
        assert_eq!(tag_width(32, 64, 2, 32), 18);
        assert_eq!(tag_width(64, 64, 2, 32), 17);
        assert_eq!(tag_width(2048, 64, 8, 32), 14);
        // Fully associative collapses the index
        assert_eq!(tag_width(16, 2048, 8, 32), 21);
        // Never below a single bit
        assert_eq!(tag_width(4096, 64, 1, 16), 1);
        // Zero associativity counts every line as a set
        assert_eq!(tag_width(32, 64, 0, 32), 17);
    }

    #[test]
    fn test_status_bits() {
        assert_eq!(status_bits(0), 2);
        assert_eq!(status_bits(1), 2);
        assert_eq!(status_bits(2), 3);
        assert_eq!(status_bits(3), 4);
        assert_eq!(status_bits(8), 5);
        assert_eq!(status_bits(16), 6);
    }

    #[test]
    fn test_default_cost() {
        let params = CostParams::default();
        let config = CacheConfig::default();

        assert_close(
            level_overhead(CacheLevel::L1i, config.l1i, 64, &params),
            512.0 * 21.0 * 2.0 * 1.1 / 8192.0,
        );
        assert_close(
            level_overhead(CacheLevel::L2, config.l2, 64, &params),
            32768.0 * 19.0 * 1.0 * 1.4 / 8192.0,
        );
        assert_eq!(data_cost(&config, &params), 2240.0);
        assert_eq!(cost(&config, &params), 2354.8);
    }

    #[test]
    fn test_larger_lines_shrink_tag_cost() {
        let params = CostParams::default();
        let mut config = CacheConfig::default();
        let base = cost(&config, &params);
        config.cacheline_b = 512;
        assert!(cost(&config, &params) < base);
        assert!(cost(&config, &params) > data_cost(&config, &params));
    }

    #[test]
    fn test_cost_breakdown() {
        let breakdown = cost_breakdown(&CacheConfig::default(), &CostParams::default());
        assert_eq!(breakdown.c_data_l1, 192.0);
        assert_eq!(breakdown.c_data_l2, 2048.0);
        assert_eq!(breakdown.avg_ways, 4.0);
        assert_close(breakdown.tag_overhead, 2144.0 * 0.5 * 1.2);
        assert_close(breakdown.total, 2240.0 + 2144.0 * 0.5 * 1.2);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(2354.7875), 2354.8);
        assert_eq!(round1(-1.04), -1.0);

        // Exact ties go to the even digit
        assert_eq!(round1(10.25), 10.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(-0.25), -0.2);
        // 0.15 and 10.35 sit just below their ties in binary
        assert_eq!(round1(0.15), 0.1);
        assert_eq!(round1(10.35), 10.3);
    }

    #[test]
    fn test_analyze() {
        let catalog = Catalog::default();
        let records = analyze(&catalog, &CostParams::default());
        assert_eq!(records.len(), 10);
        assert!(records[..5]
            .iter()
            .all(|r| r.config_type == ConfigKind::Default && r.cost == 2354.8));

        let (default, optimized) = pair_of(&records, Benchmark::Sjeng).unwrap();
        assert_eq!(default.cpi, 10.271);
        assert_eq!(optimized.cpi, 3.072);
        assert_eq!(optimized.l2_kb, 512);
        assert!(efficiency_change(default, optimized) > 0.0);

        let best = best_optimized(&records).unwrap();
        assert_eq!(best.config_type, ConfigKind::Optimized);
        assert!(records
            .iter()
            .filter(|r| r.config_type == ConfigKind::Optimized)
            .all(|r| r.cost_performance >= best.cost_performance));
        assert_eq!(best.benchmark, Benchmark::Libm);
    }

    #[test]
    fn test_write_table() {
        let catalog = Catalog::default();
        let records = analyze(&catalog, &CostParams::default());
        let mut out = Vec::new();
        write_table(&mut out, &records, &[Benchmark::Hmmer, Benchmark::Mcf]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("spechmmer"));
        assert!(text.contains("specmcf"));
        assert!(!text.contains("specsjeng    Default"));
        assert!(text.contains("BEST COST-EFFICIENCY: LIBM"));
    }
}
