//! Design-space sweep results, one CSV file per benchmark

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::Benchmark;
use crate::error::{EvalError, EvalResult};
use crate::gem5::CONFIG_COLUMN;
use crate::stats::{self, LinearFit};

pub const CPI_COLUMN: &str = "system.cpu.cpi";
pub const L2_MISS_COLUMN: &str = "system.l2.overall_miss_rate::total";

/// L2 miss rate (%) from which a workload counts as memory-bound
pub const MEMORY_BOUND_L2_PCT: f64 = 50.0;

/// Half-width of the band drawn around the workload trend line
pub const TREND_BAND: f64 = 5.0;

/// One simulated configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SweepRow {
    pub config: String,
    pub cpi: f64,
    /// Fraction in [0, 1], when the file has the column
    pub l2_miss_rate: Option<f64>,
}

impl SweepRow {
    pub fn is_baseline(&self) -> bool {
        let name = self.config.to_lowercase();
        name.contains("baseline") || name.contains("cfg1")
    }
}

/// Rows of every benchmark that has a results file
pub type SweepResults = BTreeMap<Benchmark, Vec<SweepRow>>;

/// Reads one results file. Rows with more fields than the header are
/// skipped; missing trailing fields read as empty; rows without a CPI
/// are dropped.
pub fn load_results_file(path: &Path) -> EvalResult<Vec<SweepRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let config_idx = column(CONFIG_COLUMN).ok_or_else(|| EvalError::MissingColumn {
        path: path.to_path_buf(),
        column: CONFIG_COLUMN.to_string(),
    })?;
    let cpi_idx = column(CPI_COLUMN).ok_or_else(|| EvalError::MissingColumn {
        path: path.to_path_buf(),
        column: CPI_COLUMN.to_string(),
    })?;
    let l2_idx = column(L2_MISS_COLUMN);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}: skipping row {}: {}", path.display(), i + 1, e);
                continue;
            }
        };
        if record.len() > headers.len() {
            log::warn!(
                "{}: skipping row {}: expected at most {} fields, found {}",
                path.display(),
                i + 1,
                headers.len(),
                record.len()
            );
            continue;
        }

        let parse = |idx: usize| record.get(idx).and_then(|v| v.parse::<f64>().ok());
        let Some(cpi) = parse(cpi_idx).filter(|v| v.is_finite()) else {
            continue;
        };
        rows.push(SweepRow {
            config: record.get(config_idx).unwrap_or_default().to_string(),
            cpi,
            l2_miss_rate: l2_idx.and_then(parse),
        });
    }
    Ok(rows)
}

/// Loads `<dir>/<bench>_results.csv` for every benchmark with a file.
/// A file that cannot be read is logged and left out.
pub fn load_results(dir: &Path) -> EvalResult<SweepResults> {
    if !dir.is_dir() {
        return Err(EvalError::ResultsDirMissing(dir.to_path_buf()));
    }

    let mut results = SweepResults::new();
    for benchmark in Benchmark::ALL {
        let path = dir.join(format!("{}_results.csv", benchmark.id()));
        if !path.is_file() {
            continue;
        }
        match load_results_file(&path) {
            Ok(rows) => {
                log::debug!("{}: {} configurations", benchmark, rows.len());
                results.insert(benchmark, rows);
            }
            Err(e) => log::warn!("Could not load {}: {}", benchmark, e),
        }
    }
    Ok(results)
}

pub fn baseline_row(rows: &[SweepRow]) -> Option<&SweepRow> {
    rows.iter().find(|r| r.is_baseline())
}

/// Configurations ordered from worst to best CPI
#[derive(Clone, Debug, PartialEq)]
pub struct Progression {
    pub benchmark: Benchmark,
    /// `(label, cpi)` sorted by CPI descending
    pub points: Vec<(String, f64)>,
    pub baseline_cpi: Option<f64>,
}

impl Progression {
    pub fn worst(&self) -> f64 {
        self.points.first().map(|p| p.1).unwrap_or_default()
    }

    pub fn best(&self) -> f64 {
        self.points.last().map(|p| p.1).unwrap_or_default()
    }

    /// CPI reduction from worst to best in percent
    pub fn improvement(&self) -> f64 {
        let worst = self.worst();
        if worst == 0.0 {
            return 0.0;
        }
        (worst - self.best()) / worst * 100.0
    }
}

pub fn progression(benchmark: Benchmark, rows: &[SweepRow]) -> Option<Progression> {
    if rows.is_empty() {
        return None;
    }
    let mut points: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (r.config.replace("system.cpu.", ""), r.cpi))
        .collect();
    points.sort_by(|a, b| b.1.total_cmp(&a.1));

    Some(Progression {
        benchmark,
        points,
        baseline_cpi: baseline_row(rows).map(|r| r.cpi),
    })
}

/// Baseline against best CPI of one benchmark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    pub benchmark: Benchmark,
    pub baseline_cpi: f64,
    pub best_cpi: f64,
}

impl Impact {
    /// CPI reduction in percent, absent for a non-positive baseline
    pub fn improvement(&self) -> Option<f64> {
        if self.baseline_cpi > 0.0 {
            Some((self.baseline_cpi - self.best_cpi) / self.baseline_cpi * 100.0)
        } else {
            None
        }
    }
}

/// Baseline CPI is the baseline row, or the worst one when no row is
/// marked as baseline
pub fn impact(benchmark: Benchmark, rows: &[SweepRow]) -> Option<Impact> {
    let max = rows.iter().map(|r| r.cpi).max_by(f64::total_cmp)?;
    let min = rows.iter().map(|r| r.cpi).min_by(f64::total_cmp)?;
    Some(Impact {
        benchmark,
        baseline_cpi: baseline_row(rows).map(|r| r.cpi).unwrap_or(max),
        best_cpi: min,
    })
}

/// Baseline L2 miss rate against achieved CPI improvement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkloadPoint {
    pub benchmark: Benchmark,
    pub l2_miss_pct: f64,
    pub improvement: f64,
}

impl WorkloadPoint {
    pub fn is_memory_bound(&self) -> bool {
        self.l2_miss_pct >= MEMORY_BOUND_L2_PCT
    }
}

/// Uses the baseline row, or the first row when none is marked
pub fn workload_point(benchmark: Benchmark, rows: &[SweepRow]) -> Option<WorkloadPoint> {
    let reference = baseline_row(rows).or_else(|| rows.first())?;
    let l2_miss = reference.l2_miss_rate?;
    let best = rows.iter().map(|r| r.cpi).min_by(f64::total_cmp)?;
    if reference.cpi == 0.0 {
        return None;
    }
    Some(WorkloadPoint {
        benchmark,
        l2_miss_pct: l2_miss * 100.0,
        improvement: (reference.cpi - best) / reference.cpi * 100.0,
    })
}

pub fn workload_points(results: &SweepResults) -> Vec<WorkloadPoint> {
    results
        .iter()
        .filter_map(|(benchmark, rows)| {
            let point = workload_point(*benchmark, rows);
            if point.is_none() {
                log::warn!("{}: no L2 miss rate to classify", benchmark);
            }
            point
        })
        .collect()
}

/// Trend of improvement over L2 miss rate with its correlation
pub fn workload_trend(points: &[WorkloadPoint]) -> Option<(LinearFit, Option<f64>)> {
    let xs: Vec<f64> = points.iter().map(|p| p.l2_miss_pct).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.improvement).collect();
    let fit = stats::linear_fit(&xs, &ys)?;
    Some((fit, stats::correlation(&xs, &ys)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn row(config: &str, cpi: f64, l2: Option<f64>) -> SweepRow {
        SweepRow {
            config: config.to_string(),
            cpi,
            l2_miss_rate: l2,
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eval-results-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_results_file() {
        let dir = temp_dir("load");
        let path = dir.join("specsjeng_results.csv");
        fs::write(
            &path,
            " Benchmarks , system.cpu.cpi , system.l2.overall_miss_rate::total\n\
             cfg1_baseline,10.27,0.9999\n\
             cfg2_l2_512kb,7.5,0.99\n\
             broken,row\n\
             cfg3_failed,,0.5\n\
             cfg4_cl2048,3.07,0.4\n",
        )
        .unwrap();

        let rows = load_results_file(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], row("cfg1_baseline", 10.27, Some(0.9999)));
        assert_eq!(rows[2].config, "cfg4_cl2048");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_results_short_and_long_rows() {
        let dir = temp_dir("ragged");
        let path = dir.join("spechmmer_results.csv");
        fs::write(
            &path,
            "Benchmarks,system.cpu.cpi,system.l2.overall_miss_rate::total\n\
             cfg1_baseline,1.188,0.078\n\
             cfg2_short,1.18\n\
             cfg3_long,1.17,0.05,extra\n",
        )
        .unwrap();

        let rows = load_results_file(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                row("cfg1_baseline", 1.188, Some(0.078)),
                row("cfg2_short", 1.18, None),
            ]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_results_missing_column() {
        let dir = temp_dir("missing");
        let path = dir.join("specmcf_results.csv");
        fs::write(&path, "Benchmarks,sim_seconds\ncfg1,0.1\n").unwrap();
        assert!(matches!(
            load_results_file(&path),
            Err(EvalError::MissingColumn { .. })
        ));

        // The directory loader leaves the broken file out
        let results = load_results(&dir).unwrap();
        assert!(results.is_empty());

        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            load_results(&dir),
            Err(EvalError::ResultsDirMissing(_))
        ));
    }

    #[test]
    fn test_baseline_detection() {
        assert!(row("CFG1", 1.0, None).is_baseline());
        assert!(row("run_Baseline", 1.0, None).is_baseline());
        assert!(!row("cfg2", 1.0, None).is_baseline());
    }

    #[test]
    fn test_progression() {
        let rows = vec![
            row("system.cpu.cfg2", 2.0, None),
            row("cfg1_baseline", 4.0, None),
            row("cfg3", 1.0, None),
        ];
        let p = progression(Benchmark::Sjeng, &rows).unwrap();
        let labels: Vec<&str> = p.points.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["cfg1_baseline", "cfg2", "cfg3"]);
        assert_eq!(p.worst(), 4.0);
        assert_eq!(p.best(), 1.0);
        assert_eq!(p.improvement(), 75.0);
        assert_eq!(p.baseline_cpi, Some(4.0));

        assert!(progression(Benchmark::Sjeng, &[]).is_none());
    }

    #[test]
    fn test_impact_falls_back_to_worst() {
        let rows = vec![row("a", 2.0, None), row("b", 3.0, None), row("c", 1.5, None)];
        let i = impact(Benchmark::Mcf, &rows).unwrap();
        assert_eq!(i.baseline_cpi, 3.0);
        assert_eq!(i.best_cpi, 1.5);
        assert_eq!(i.improvement(), Some(50.0));

        let rows = vec![row("x", 2.0, None), row("cfg1", 1.0, None)];
        assert_eq!(impact(Benchmark::Mcf, &rows).unwrap().baseline_cpi, 1.0);
        assert!(impact(Benchmark::Mcf, &[]).is_none());
    }

    #[test]
    fn test_workload_points() {
        let mut results = SweepResults::new();
        results.insert(
            Benchmark::Sjeng,
            vec![row("cfg1", 10.0, Some(0.9999)), row("cfg2", 3.0, Some(0.2))],
        );
        results.insert(
            Benchmark::Hmmer,
            vec![row("first", 1.2, Some(0.078)), row("cfg9", 1.17, Some(0.07))],
        );
        results.insert(Benchmark::Mcf, vec![row("cfg1", 1.3, None)]);

        let points = workload_points(&results);
        assert_eq!(points.len(), 2);

        let hmmer = points[0];
        assert_eq!(hmmer.benchmark, Benchmark::Hmmer);
        assert!((hmmer.l2_miss_pct - 7.8).abs() < 1e-9);
        assert!(!hmmer.is_memory_bound());

        let sjeng = points[1];
        assert!((sjeng.improvement - 70.0).abs() < 1e-9);
        assert!(sjeng.is_memory_bound());

        let (fit, rho) = workload_trend(&points).unwrap();
        assert!(fit.slope > 0.0);
        assert!((rho.unwrap() - 1.0).abs() < 1e-9);
    }
}
