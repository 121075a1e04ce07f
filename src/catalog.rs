//! Benchmarks and the measurements taken on them

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::cache::{CacheConfig, CacheGeometry};
use crate::error::{EvalError, EvalResult};

/// SPEC CPU2006 benchmarks used throughout the evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Benchmark {
    Bzip,
    Hmmer,
    Mcf,
    Sjeng,
    Libm,
}

impl Benchmark {
    /// Order used for result files and sweep charts
    pub const ALL: [Benchmark; 5] = [
        Benchmark::Bzip,
        Benchmark::Hmmer,
        Benchmark::Mcf,
        Benchmark::Sjeng,
        Benchmark::Libm,
    ];

    /// Identifier used by the gem5 run scripts, e.g. `specbzip`
    pub fn id(&self) -> &'static str {
        match self {
            Benchmark::Bzip => "specbzip",
            Benchmark::Hmmer => "spechmmer",
            Benchmark::Mcf => "specmcf",
            Benchmark::Sjeng => "specsjeng",
            Benchmark::Libm => "speclibm",
        }
    }

    /// SPEC short name, e.g. `bzip2`
    pub fn short_name(&self) -> &'static str {
        match self {
            Benchmark::Bzip => "bzip2",
            Benchmark::Hmmer => "hmmer",
            Benchmark::Mcf => "mcf",
            Benchmark::Sjeng => "sjeng",
            Benchmark::Libm => "lbm",
        }
    }

    /// Chart label: the id without its `spec` prefix, upper-cased
    pub fn label(&self) -> String {
        self.id().trim_start_matches("spec").to_uppercase()
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Benchmark {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Benchmark::ALL
            .into_iter()
            .find(|b| b.id() == lower || b.short_name() == lower)
            .ok_or_else(|| EvalError::UnknownBenchmark(s.to_string()))
    }
}

/// Baseline run at 2GHz with DDR3_1600 memory.
/// Miss rates are percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaselineRun {
    pub benchmark: Benchmark,
    pub sim_seconds: f64,
    pub cpi: f64,
    pub l1d_miss_pct: f64,
    pub l1i_miss_pct: f64,
    pub l2_miss_pct: f64,
}

/// CPU clock sweep of a single benchmark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyRun {
    pub benchmark: Benchmark,
    pub cpi_1ghz: f64,
    pub cpi_2ghz: f64,
    pub cpi_4ghz: f64,
    pub sim_1ghz: f64,
    pub sim_4ghz: f64,
}

/// DDR3_1600 to DDR3_2133 memory upgrade of a single benchmark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryUpgradeRun {
    pub benchmark: Benchmark,
    pub cpi_ddr3_1600: f64,
    pub cpi_ddr3_2133: f64,
}

/// Optimised cache configuration found for a benchmark
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedConfig {
    pub benchmark: Benchmark,
    pub config: CacheConfig,
    pub cpi: f64,
}

/// All measurements the charts are drawn from
#[derive(Clone, Debug)]
pub struct Catalog {
    pub baseline: Vec<BaselineRun>,
    pub frequency: Vec<FrequencyRun>,
    pub memory_upgrade: Vec<MemoryUpgradeRun>,
    pub default_config: CacheConfig,
    /// CPI of each benchmark on the default configuration
    pub default_cpis: Vec<(Benchmark, f64)>,
    pub optimized: Vec<OptimizedConfig>,
}

impl Default for Catalog {
    /// Measurements collected for the assignment
    fn default() -> Self {
        use Benchmark::*;

        let baseline = vec![
            BaselineRun::make(Bzip, 0.0840, 1.680, 1.48, 0.008, 28.22),
            BaselineRun::make(Mcf, 0.0647, 1.294, 0.21, 2.36, 5.51),
            BaselineRun::make(Hmmer, 0.0594, 1.188, 0.16, 0.022, 7.82),
            BaselineRun::make(Sjeng, 0.5135, 10.271, 12.18, 0.002, 99.99),
            BaselineRun::make(Libm, 0.1747, 3.494, 6.10, 0.009, 99.99),
        ];

        let frequency = vec![
            FrequencyRun::make(Bzip, [1.61, 1.68, 1.83], [0.1610, 0.0457]),
            FrequencyRun::make(Mcf, [1.27, 1.29, 1.33], [0.1273, 0.0333]),
            FrequencyRun::make(Hmmer, [1.19, 1.19, 1.19], [0.1185, 0.0298]),
            FrequencyRun::make(Sjeng, [7.04, 10.27, 16.70], [0.7041, 0.4175]),
            FrequencyRun::make(Libm, [2.62, 3.49, 5.31], [0.2623, 0.1327]),
        ];

        let memory_upgrade = vec![
            MemoryUpgradeRun::make(Hmmer, 1.1879, 1.1877),
            MemoryUpgradeRun::make(Mcf, 1.2940, 1.2909),
            MemoryUpgradeRun::make(Bzip, 1.6800, 1.6719),
            MemoryUpgradeRun::make(Libm, 3.4938, 3.4306),
            MemoryUpgradeRun::make(Sjeng, 10.2705, 9.8626),
        ];

        let default_cpis = vec![
            (Hmmer, 1.188),
            (Mcf, 1.294),
            (Bzip, 1.680),
            (Libm, 3.494),
            (Sjeng, 10.271),
        ];

        let optimized = vec![
            OptimizedConfig::make(Hmmer, [64, 64, 512], [2, 2, 4], 256, 1.177),
            OptimizedConfig::make(Mcf, [32, 64, 2048], [2, 2, 8], 512, 1.105),
            OptimizedConfig::make(Bzip, [32, 128, 4096], [2, 16, 16], 256, 1.589),
            OptimizedConfig::make(Libm, [16, 16, 128], [1, 2, 1], 2048, 1.496),
            OptimizedConfig::make(Sjeng, [16, 128, 512], [2, 4, 2], 2048, 3.072),
        ];

        Self {
            baseline,
            frequency,
            memory_upgrade,
            default_config: CacheConfig::default(),
            default_cpis,
            optimized,
        }
    }
}

impl Catalog {
    /// Built-in measurements, with the baseline table replaced by
    /// `baseline.csv` when the results directory carries one
    pub fn load(results_dir: &Path) -> EvalResult<Self> {
        let mut catalog = Catalog::default();
        let override_path = results_dir.join("baseline.csv");
        if override_path.is_file() {
            log::info!("Using baseline override {}", override_path.display());
            catalog.baseline = load_baseline_csv(&override_path)?;
        }
        Ok(catalog)
    }

    pub fn baseline_of(&self, benchmark: Benchmark) -> Option<&BaselineRun> {
        self.baseline.iter().find(|r| r.benchmark == benchmark)
    }

    pub fn frequency_of(&self, benchmark: Benchmark) -> Option<&FrequencyRun> {
        self.frequency.iter().find(|r| r.benchmark == benchmark)
    }
}

impl BaselineRun {
    pub fn make(
        benchmark: Benchmark,
        sim_seconds: f64,
        cpi: f64,
        l1d_miss_pct: f64,
        l1i_miss_pct: f64,
        l2_miss_pct: f64,
    ) -> Self {
        Self {
            benchmark,
            sim_seconds,
            cpi,
            l1d_miss_pct,
            l1i_miss_pct,
            l2_miss_pct,
        }
    }
}

impl FrequencyRun {
    /// `cpis` at 1, 2 and 4GHz; `sims` in seconds at 1 and 4GHz
    pub fn make(benchmark: Benchmark, cpis: [f64; 3], sims: [f64; 2]) -> Self {
        Self {
            benchmark,
            cpi_1ghz: cpis[0],
            cpi_2ghz: cpis[1],
            cpi_4ghz: cpis[2],
            sim_1ghz: sims[0],
            sim_4ghz: sims[1],
        }
    }
}

impl MemoryUpgradeRun {
    pub fn make(benchmark: Benchmark, cpi_ddr3_1600: f64, cpi_ddr3_2133: f64) -> Self {
        Self {
            benchmark,
            cpi_ddr3_1600,
            cpi_ddr3_2133,
        }
    }
}

impl OptimizedConfig {
    /// Sizes (KB) and associativities are given as `[L1i, L1d, L2]`
    pub fn make(
        benchmark: Benchmark,
        sizes_kb: [u32; 3],
        assocs: [u32; 3],
        cacheline_b: u32,
        cpi: f64,
    ) -> Self {
        Self {
            benchmark,
            config: CacheConfig {
                name: format!("{}-opt", benchmark.id()),
                l1i: CacheGeometry::make(sizes_kb[0], assocs[0]),
                l1d: CacheGeometry::make(sizes_kb[1], assocs[1]),
                l2: CacheGeometry::make(sizes_kb[2], assocs[2]),
                cacheline_b,
            },
            cpi,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BaselineRecord {
    benchmark: String,
    sim_seconds: f64,
    cpi: f64,
    l1d_miss_pct: f64,
    l1i_miss_pct: f64,
    l2_miss_pct: f64,
}

/// Reads a baseline table with one row per benchmark
pub fn load_baseline_csv(path: &Path) -> EvalResult<Vec<BaselineRun>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut runs = Vec::new();
    for record in reader.deserialize() {
        let record: BaselineRecord = record?;
        runs.push(BaselineRun::make(
            record.benchmark.parse()?,
            record.sim_seconds,
            record.cpi,
            record.l1d_miss_pct,
            record.l1i_miss_pct,
            record.l2_miss_pct,
        ));
    }

    if runs.is_empty() {
        return Err(EvalError::NoData(format!(
            "'{}' holds no baseline rows",
            path.display()
        )));
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_names() {
        assert_eq!(Benchmark::Libm.label(), "LIBM");
        assert_eq!(Benchmark::Bzip.label(), "BZIP");
        assert_eq!("lbm".parse::<Benchmark>().unwrap(), Benchmark::Libm);
        assert_eq!("SpecSjeng".parse::<Benchmark>().unwrap(), Benchmark::Sjeng);
        assert!("gcc".parse::<Benchmark>().is_err());
    }

    #[test]
    fn test_default_catalog_is_complete() {
        let catalog = Catalog::default();
        for benchmark in Benchmark::ALL {
            assert!(catalog.baseline_of(benchmark).is_some());
            assert!(catalog.frequency_of(benchmark).is_some());
            assert!(catalog.default_cpis.iter().any(|(b, _)| *b == benchmark));
            assert!(catalog.optimized.iter().any(|o| o.benchmark == benchmark));
        }
        for opt in &catalog.optimized {
            assert_eq!(opt.config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_load_baseline_override() {
        let dir = std::env::temp_dir().join(format!("eval-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("baseline.csv"),
            "benchmark, sim_seconds, cpi, l1d_miss_pct, l1i_miss_pct, l2_miss_pct\n\
             specmcf, 0.07, 1.3, 0.2, 2.4, 5.5\n",
        )
        .unwrap();

        let catalog = Catalog::load(&dir).unwrap();
        assert_eq!(catalog.baseline.len(), 1);
        assert_eq!(catalog.baseline[0].benchmark, Benchmark::Mcf);
        assert_eq!(catalog.baseline[0].cpi, 1.3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_without_override() {
        let catalog = Catalog::load(Path::new("/nonexistent/results")).unwrap();
        assert_eq!(catalog.baseline.len(), 5);
    }
}
