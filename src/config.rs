//! Evaluation policy: where data is read from and charts are written to

use std::fs;
use std::path::PathBuf;

use crate::catalog::Benchmark;
use crate::cost::CostParams;
use crate::error::EvalResult;

/// Output sub-directory of each stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Baseline,
    Sweep,
    Cost,
}

impl Stage {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Baseline => "task1",
            Stage::Sweep => "task2",
            Stage::Cost => "task3",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EvalPolicy {
    /// Directory holding `<bench>_results.csv` and optionally `baseline.csv`
    pub results_dir: PathBuf,
    /// Root of the chart output tree
    pub output_dir: PathBuf,
    /// Directory of gem5 runs, `<bench>/<config>/stats.txt`
    pub runs_dir: PathBuf,
    /// Benchmarks that get a CPI progression chart
    pub progression: Vec<Benchmark>,
    pub cost_params: CostParams,
    pub verbose: bool,
}

impl Default for EvalPolicy {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            output_dir: PathBuf::from("plots"),
            runs_dir: PathBuf::from("runs"),
            progression: vec![Benchmark::Sjeng],
            cost_params: CostParams::default(),
            verbose: false,
        }
    }
}

impl EvalPolicy {
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.output_dir.join(stage.dir_name())
    }

    /// Creates the stage directory if needed
    pub fn prepare_stage_dir(&self, stage: Stage) -> EvalResult<PathBuf> {
        let dir = self.stage_dir(stage);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn results_file(&self, benchmark: Benchmark) -> PathBuf {
        self.results_dir
            .join(format!("{}_results.csv", benchmark.id()))
    }
}

/// Initialise `env_logger` at `info`, or `debug` when verbose.
/// `RUST_LOG` takes precedence.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let policy = EvalPolicy::default();
        assert_eq!(policy.stage_dir(Stage::Baseline), PathBuf::from("plots/task1"));
        assert_eq!(policy.stage_dir(Stage::Cost), PathBuf::from("plots/task3"));
        assert_eq!(
            policy.results_file(Benchmark::Libm),
            PathBuf::from("results/speclibm_results.csv")
        );
        assert_eq!(policy.progression, vec![Benchmark::Sjeng]);
    }

    #[test]
    fn test_prepare_stage_dir() {
        let mut policy = EvalPolicy::default();
        policy.output_dir = std::env::temp_dir().join(format!("eval-config-{}", std::process::id()));
        let dir = policy.prepare_stage_dir(Stage::Sweep).unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("task2"));
        fs::remove_dir_all(&policy.output_dir).unwrap();
    }
}
