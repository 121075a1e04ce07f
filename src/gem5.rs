//! gem5 `stats.txt` parsing and collection into per-benchmark CSV files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Benchmark;
use crate::error::{EvalResult, StatsError};

/// Stats copied into every results row, after the configuration name
pub const COLLECTED_STATS: [&str; 5] = [
    "sim_seconds",
    "system.cpu.cpi",
    "system.cpu.dcache.overall_miss_rate::total",
    "system.cpu.icache.overall_miss_rate::total",
    "system.l2.overall_miss_rate::total",
];

/// Name of the configuration column of a results file
pub const CONFIG_COLUMN: &str = "Benchmarks";

const DUMP_MARKER: &str = "---------- ";

/// First statistics dump of a `stats.txt` file
#[derive(Clone, Debug, Default)]
pub struct StatsDump {
    values: BTreeMap<String, f64>,
}

impl StatsDump {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse the first dump of a stats file
pub fn parse_stats_file(path: &Path) -> Result<StatsDump, StatsError> {
    let content = fs::read_to_string(path)
        .map_err(|e| StatsError::FileReadError(path.to_path_buf(), e))?;
    parse_stats(&content, path)
}

/// Parse stats text; `path` only labels errors
pub fn parse_stats(content: &str, path: &Path) -> Result<StatsDump, StatsError> {
    let mut dump = StatsDump::default();
    let mut seen_begin = false;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(DUMP_MARKER) {
            if line.contains("End Simulation Statistics") {
                break;
            }
            if seen_begin {
                // A second begin marker without an end one
                break;
            }
            seen_begin = true;
            continue;
        }

        // Strip the trailing description
        let line = match line.find('#') {
            Some(pos) => line[..pos].trim(),
            None => line,
        };
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            continue;
        };
        let Some(value) = parts.next() else {
            return Err(StatsError::ParseError {
                path: path.to_path_buf(),
                line: line_num + 1,
                reason: format!("stat '{}' has no value", name),
            });
        };

        // Distribution rows carry a percentage column, keep the count only
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                dump.values.insert(name.to_string(), v);
            }
            _ => log::debug!("{}:{}: skipping '{}'", path.display(), line_num + 1, name),
        }
    }

    Ok(dump)
}

/// One row of a results file
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedRun {
    pub config: String,
    pub values: Vec<Option<f64>>,
}

/// Parse every `<runs>/<bench>/<config>/stats.txt`, sorted by config name
pub fn collect_benchmark(bench_dir: &Path) -> EvalResult<Vec<CollectedRun>> {
    let mut config_dirs: Vec<PathBuf> = fs::read_dir(bench_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.join("stats.txt").is_file())
        .collect();
    config_dirs.sort();

    let mut runs = Vec::new();
    for dir in config_dirs {
        let config = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dump = parse_stats_file(&dir.join("stats.txt"))?;
        if dump.is_empty() {
            log::warn!("{}: empty stats dump", dir.display());
        }
        let values = COLLECTED_STATS.iter().map(|name| dump.get(name)).collect();
        runs.push(CollectedRun { config, values });
    }
    Ok(runs)
}

pub fn write_results(path: &Path, runs: &[CollectedRun]) -> EvalResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![CONFIG_COLUMN];
    header.extend(COLLECTED_STATS);
    writer.write_record(&header)?;

    for run in runs {
        let mut record = vec![run.config.clone()];
        record.extend(
            run.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Collect all benchmark run directories found under `runs_dir` into
/// `<results_dir>/<bench>_results.csv`; returns the files written
pub fn collect(runs_dir: &Path, results_dir: &Path) -> EvalResult<Vec<PathBuf>> {
    fs::create_dir_all(results_dir)?;

    let mut written = Vec::new();
    for benchmark in Benchmark::ALL {
        let bench_dir = runs_dir.join(benchmark.id());
        if !bench_dir.is_dir() {
            log::debug!("No runs for {}", benchmark);
            continue;
        }
        let runs = collect_benchmark(&bench_dir)?;
        if runs.is_empty() {
            log::warn!("{}: no stats.txt found", bench_dir.display());
            continue;
        }
        let output = results_dir.join(format!("{}_results.csv", benchmark.id()));
        write_results(&output, &runs)?;
        log::info!("Collected {} runs into {}", runs.len(), output.display());
        written.push(output);
    }
    Ok(written)
}
