//! Stage runners shared by the binaries

use std::io;
use std::path::{Path, PathBuf};

use crate::baseline::{scaling_points, upgrade_points};
use crate::catalog::{Benchmark, Catalog};
use crate::config::{EvalPolicy, Stage};
use crate::cost::{self, CostRecord};
use crate::error::{EvalError, EvalResult};
use crate::gem5;
use crate::plot;
use crate::results::{self, SweepResults};

/// Charts written by one stage, and the ones that failed
#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl StageReport {
    pub fn make(stage: Stage) -> Self {
        Self {
            stage,
            written: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Draws one chart; a failure is logged and recorded, never returned
    pub fn render<F>(&mut self, path: PathBuf, draw: F)
    where
        F: FnOnce(&Path) -> EvalResult<()>,
    {
        match draw(&path) {
            Ok(()) => {
                log::info!("Saved: {}", path.display());
                self.written.push(path);
            }
            Err(e) => {
                log::error!("Failed to draw {}: {}", path.display(), e);
                self.failed.push((path, e.to_string()));
            }
        }
    }

    fn log_summary(&self) {
        log::info!(
            "{}: {} charts written, {} failed",
            self.stage.dir_name(),
            self.written.len(),
            self.failed.len()
        );
    }
}

/// A stage skipped for lack of data
fn no_model(what: &str) -> EvalResult<()> {
    Err(EvalError::NoData(what.to_string()))
}

fn fmt_rho(rho: Option<f64>) -> String {
    rho.map(|r| format!("{:.3}", r))
        .unwrap_or_else(|| "undefined".to_string())
}

/// Baseline, clock scaling and memory upgrade charts
pub fn run_baseline(policy: &EvalPolicy) -> EvalResult<StageReport> {
    let catalog = Catalog::load(&policy.results_dir)?;
    let dir = policy.prepare_stage_dir(Stage::Baseline)?;
    let mut report = StageReport::make(Stage::Baseline);

    report.render(dir.join("cpi_simtime_dual_axis.png"), |path| {
        match plot::baseline::dual_axis_model(&catalog.baseline) {
            Some(model) => plot::baseline::draw_dual_axis(path, &model),
            None => no_model("no baseline runs"),
        }
    });
    report.render(dir.join("cache_miss_heatmap.png"), |path| {
        match plot::baseline::heatmap_model(&catalog.baseline) {
            Some(model) => plot::baseline::draw_heatmap(path, &model),
            None => no_model("no baseline runs"),
        }
    });

    let scaling = plot::baseline::scaling_model(&scaling_points(&catalog));
    log::info!(
        "Clock scaling: correlation(L2 miss, efficiency) = {}",
        fmt_rho(scaling.correlation)
    );
    for point in &scaling.points {
        log::debug!(
            "{}: speedup {:.2}x, efficiency {:.1}%, {}",
            point.benchmark,
            point.speedup,
            point.efficiency,
            if point.is_memory_bound() { "memory-bound" } else { "compute-bound" }
        );
    }
    report.render(dir.join("scaling_vs_cache_miss.png"), |path| {
        plot::baseline::draw_scaling(path, &scaling)
    });

    let upgrade = plot::baseline::upgrade_model(&upgrade_points(&catalog));
    log::info!(
        "Memory upgrade: correlation(effective miss, improvement) = {}, R² = {}",
        fmt_rho(upgrade.correlation),
        fmt_rho(upgrade.r_squared)
    );
    report.render(dir.join("memory_improvement_vs_effective_miss.png"), |path| {
        plot::baseline::draw_upgrade(path, &upgrade)
    });

    report.log_summary();
    Ok(report)
}

/// Design-space sweep charts; fails when the results directory is missing
pub fn run_sweep(policy: &EvalPolicy) -> EvalResult<StageReport> {
    let sweep = results::load_results(&policy.results_dir)?;
    if sweep.is_empty() {
        log::warn!(
            "No <bench>_results.csv in {}",
            policy.results_dir.display()
        );
    }
    let dir = policy.prepare_stage_dir(Stage::Sweep)?;
    let mut report = StageReport::make(Stage::Sweep);

    for benchmark in &policy.progression {
        report.render(progression_path(&dir, *benchmark), |path| {
            let rows = sweep
                .get(benchmark)
                .ok_or_else(|| EvalError::NoData(format!("no results for {}", benchmark)))?;
            match results::progression(*benchmark, rows) {
                Some(progression) => plot::sweep::draw_progression(path, &progression),
                None => no_model("no configurations"),
            }
        });
    }

    let impacts = impacts(&sweep);
    for imp in &impacts {
        if let Some(improvement) = imp.improvement() {
            log::info!(
                "{}: CPI {:.3} -> {:.3} ({:.1}% better)",
                imp.benchmark,
                imp.baseline_cpi,
                imp.best_cpi,
                improvement
            );
        }
    }
    report.render(dir.join("optimization_impact.png"), |path| {
        plot::sweep::draw_impact(path, &impacts)
    });

    let points = results::workload_points(&sweep);
    for point in &points {
        log::info!(
            "{}: L2 miss {:.1}%, improvement {:.1}%, {}",
            point.benchmark,
            point.l2_miss_pct,
            point.improvement,
            if point.is_memory_bound() { "MEMORY-BOUND" } else { "COMPUTE-BOUND" }
        );
    }
    report.render(dir.join("workload_classification.png"), |path| {
        match plot::sweep::workload_model(&points) {
            Some(model) => {
                log::info!(
                    "Workload classification: correlation = {}",
                    fmt_rho(model.correlation)
                );
                plot::sweep::draw_workload(path, &model)
            }
            None => no_model("no benchmark with an L2 miss rate"),
        }
    });

    report.log_summary();
    Ok(report)
}

/// `<dir>/<bench id>_cpi_progression.png`
fn progression_path(dir: &Path, benchmark: Benchmark) -> PathBuf {
    dir.join(format!("{}_cpi_progression.png", benchmark.id()))
}

fn impacts(sweep: &SweepResults) -> Vec<results::Impact> {
    sweep
        .iter()
        .filter_map(|(benchmark, rows)| results::impact(*benchmark, rows))
        .collect()
}

/// Cost analysis: table on stdout, `cost_analysis.csv` and two charts
#[derive(Debug)]
pub struct CostReport {
    pub records: Vec<CostRecord>,
    pub csv: PathBuf,
    pub charts: StageReport,
}

/// Benchmarks in the order of the optimised configurations
fn cost_order(catalog: &Catalog) -> Vec<Benchmark> {
    catalog.optimized.iter().map(|o| o.benchmark).collect()
}

pub fn run_cost(policy: &EvalPolicy) -> EvalResult<CostReport> {
    let catalog = Catalog::load(&policy.results_dir)?;
    let params = &policy.cost_params;
    catalog.default_config.validate()?;
    for opt in &catalog.optimized {
        opt.config.validate()?;
    }
    log::debug!("Cost parameters: {:?}", params);
    let breakdown = cost::cost_breakdown(&catalog.default_config, params);
    log::debug!(
        "Default configuration: data {:.1} (L1 {:.1}, L2 {:.1}), tag proxy {:.1}, {:.1}-way mean",
        breakdown.c_data,
        breakdown.c_data_l1,
        breakdown.c_data_l2,
        breakdown.tag_overhead,
        breakdown.avg_ways
    );

    let records = cost::analyze(&catalog, params);
    let order = cost_order(&catalog);
    let dir = policy.prepare_stage_dir(Stage::Cost)?;

    let mut charts = StageReport::make(Stage::Cost);
    charts.render(dir.join("cost_performance_tradeoff.png"), |path| {
        match plot::cost::tradeoff_model(&records, &order) {
            Some(model) => plot::cost::draw_tradeoff(path, &model),
            None => no_model("no cost records"),
        }
    });
    charts.render(dir.join("cost_efficiency.png"), |path| {
        plot::cost::draw_efficiency(path, &plot::cost::efficiency_bars(&records, &order))
    });

    cost::write_table(&mut io::stdout().lock(), &records, &order)?;

    let csv = dir.join("cost_analysis.csv");
    cost::write_csv(&csv, &records)?;
    log::info!("Saved: {}", csv.display());

    charts.log_summary();
    Ok(CostReport {
        records,
        csv,
        charts,
    })
}

/// Collects gem5 runs into the results directory
pub fn run_collect(policy: &EvalPolicy) -> EvalResult<Vec<PathBuf>> {
    if !policy.runs_dir.is_dir() {
        return Err(EvalError::ConfigError(format!(
            "runs directory {} does not exist",
            policy.runs_dir.display()
        )));
    }
    let written = gem5::collect(&policy.runs_dir, &policy.results_dir)?;
    if written.is_empty() {
        log::warn!("No benchmark runs under {}", policy.runs_dir.display());
    }
    Ok(written)
}

#[derive(Debug)]
pub struct AllReport {
    pub baseline: StageReport,
    /// Absent when there is no results directory
    pub sweep: Option<StageReport>,
    pub cost: CostReport,
}

/// Every chart stage; the sweep is skipped when no results were collected
pub fn run_all(policy: &EvalPolicy) -> EvalResult<AllReport> {
    let baseline = run_baseline(policy)?;
    let sweep = match run_sweep(policy) {
        Ok(report) => Some(report),
        Err(EvalError::ResultsDirMissing(dir)) => {
            log::warn!("Skipping sweep charts: {} does not exist", dir.display());
            None
        }
        Err(e) => return Err(e),
    };
    let cost = run_cost(policy)?;
    Ok(AllReport {
        baseline,
        sweep,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_policy(tag: &str) -> EvalPolicy {
        let root = std::env::temp_dir().join(format!("eval-run-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        EvalPolicy {
            results_dir: root.join("results"),
            output_dir: root.join("plots"),
            runs_dir: root.join("runs"),
            ..EvalPolicy::default()
        }
    }

    fn cleanup(policy: &EvalPolicy) {
        if let Some(root) = policy.output_dir.parent() {
            let _ = fs::remove_dir_all(root);
        }
    }

    #[test]
    fn test_render_records_failures() {
        let policy = temp_policy("render");
        let dir = policy.prepare_stage_dir(Stage::Sweep).unwrap();
        let mut report = StageReport::make(Stage::Sweep);

        report.render(dir.join("ok.txt"), |path| {
            fs::write(path, "chart")?;
            Ok(())
        });
        report.render(dir.join("bad.png"), |_| no_model("nothing to draw"));

        assert_eq!(report.written, vec![dir.join("ok.txt")]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("nothing to draw"));
        assert!(!report.is_complete());
        cleanup(&policy);
    }

    #[test]
    fn test_sweep_requires_results_dir() {
        let policy = temp_policy("sweep");
        assert!(matches!(
            run_sweep(&policy),
            Err(EvalError::ResultsDirMissing(_))
        ));
    }

    #[test]
    fn test_sweep_progression_file_name() {
        let policy = temp_policy("progression");
        fs::create_dir_all(&policy.results_dir).unwrap();
        fs::write(
            policy.results_file(Benchmark::Sjeng),
            "Benchmarks,system.cpu.cpi,system.l2.overall_miss_rate::total\n\
             cfg1_baseline,10.27,0.9999\n\
             cfg2_cl256,5.1,0.9\n\
             cfg3_cl2048,3.07,0.4\n",
        )
        .unwrap();

        let dir = policy.stage_dir(Stage::Sweep);
        assert_eq!(
            progression_path(&dir, Benchmark::Sjeng),
            dir.join("specsjeng_cpi_progression.png")
        );

        let report = run_sweep(&policy).unwrap();
        let expected = dir.join("specsjeng_cpi_progression.png");
        let attempted: Vec<&PathBuf> = report
            .written
            .iter()
            .chain(report.failed.iter().map(|(path, _)| path))
            .collect();
        assert!(attempted.contains(&&expected), "{:?}", attempted);
        assert!(!attempted
            .iter()
            .any(|p| p.ends_with("sjeng_cpi_progression.png") && **p != expected));
        if report.failed.is_empty() {
            assert!(report.written.contains(&expected));
            assert!(expected.is_file());
        }
        cleanup(&policy);
    }

    #[test]
    fn test_collect() {
        let policy = temp_policy("collect");
        assert!(matches!(
            run_collect(&policy),
            Err(EvalError::ConfigError(_))
        ));

        let run_dir = policy.runs_dir.join("spechmmer").join("cfg1");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(
            run_dir.join("stats.txt"),
            "---------- Begin Simulation Statistics ----------\n\
             sim_seconds 0.059 # seconds\n\
             system.cpu.cpi 1.188 # CPI\n\
             ---------- End Simulation Statistics   ----------\n",
        )
        .unwrap();

        let written = run_collect(&policy).unwrap();
        assert_eq!(written, vec![policy.results_file(Benchmark::Hmmer)]);

        let rows = results::load_results_file(&written[0]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].config, "cfg1");
        assert_eq!(rows[0].cpi, 1.188);
        cleanup(&policy);
    }

    #[test]
    fn test_cost_order_and_impacts() {
        let catalog = Catalog::default();
        assert_eq!(
            cost_order(&catalog),
            vec![
                Benchmark::Hmmer,
                Benchmark::Mcf,
                Benchmark::Bzip,
                Benchmark::Libm,
                Benchmark::Sjeng
            ]
        );

        let mut sweep = SweepResults::new();
        sweep.insert(
            Benchmark::Sjeng,
            vec![
                results::SweepRow {
                    config: "baseline".to_string(),
                    cpi: 10.0,
                    l2_miss_rate: Some(0.99),
                },
                results::SweepRow {
                    config: "cfg2".to_string(),
                    cpi: 4.0,
                    l2_miss_rate: Some(0.5),
                },
            ],
        );
        let impacts = impacts(&sweep);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].improvement(), Some(60.0));
        assert_eq!(fmt_rho(None), "undefined");
    }
}
