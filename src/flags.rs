use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::Benchmark;
use crate::config::EvalPolicy;
use crate::error::{EvalError, EvalResult};

/// Charts and cost analysis of SPEC CPU2006 gem5 runs.
#[derive(Parser, Debug)]
#[command(name = "report", version)]
pub struct EvalArgs {
    /// Directory holding <bench>_results.csv and an optional baseline.csv.
    #[arg(long, global = true, default_value = "results")]
    pub results_dir: PathBuf,

    /// Root directory of the generated charts.
    #[arg(short, long, global = true, default_value = "plots")]
    pub output_dir: PathBuf,

    /// Directory of gem5 runs laid out as <bench>/<config>/stats.txt.
    #[arg(long, global = true, default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Benchmarks that get a CPI progression chart, comma separated.
    #[arg(long, global = true, value_delimiter = ',')]
    pub progression: Vec<Benchmark>,

    /// L1 cell density factor of the cost model.
    #[arg(long, global = true)]
    pub gamma_l1: Option<f64>,

    /// L2 cell density factor of the cost model.
    #[arg(long, global = true)]
    pub gamma_l2: Option<f64>,

    /// Address width in bits used for tag widths.
    #[arg(long, global = true)]
    pub addr_width: Option<u32>,

    /// Logic overhead per way of the cost model.
    #[arg(long, global = true)]
    pub delta: Option<f64>,

    /// Enables debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Baseline, clock scaling and memory upgrade charts.
    Baseline,
    /// Design-space sweep charts from the results directory.
    Sweep,
    /// Cost model analysis and charts.
    Cost,
    /// Collect gem5 stats.txt files into results CSV files.
    Collect,
    /// Every chart stage (default).
    All,
}

impl EvalArgs {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::All)
    }

    /// Builds the policy, rejecting cost parameters the model cannot use
    pub fn policy(&self) -> EvalResult<EvalPolicy> {
        let mut policy = EvalPolicy {
            results_dir: self.results_dir.clone(),
            output_dir: self.output_dir.clone(),
            runs_dir: self.runs_dir.clone(),
            verbose: self.verbose,
            ..EvalPolicy::default()
        };
        if !self.progression.is_empty() {
            policy.progression = self.progression.clone();
        }

        let params = &mut policy.cost_params;
        if let Some(gamma) = self.gamma_l1 {
            params.gamma_l1 = positive("gamma-l1", gamma)?;
        }
        if let Some(gamma) = self.gamma_l2 {
            params.gamma_l2 = positive("gamma-l2", gamma)?;
        }
        if let Some(delta) = self.delta {
            if !delta.is_finite() || delta < 0.0 {
                return Err(EvalError::ConfigError(format!(
                    "delta must be non-negative, got {}",
                    delta
                )));
            }
            params.delta = delta;
        }
        if let Some(width) = self.addr_width {
            if !(1..=64).contains(&width) {
                return Err(EvalError::ConfigError(format!(
                    "addr-width must be within 1..=64, got {}",
                    width
                )));
            }
            params.addr_width = width;
        }

        Ok(policy)
    }
}

fn positive(name: &str, value: f64) -> EvalResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EvalError::ConfigError(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = EvalArgs::try_parse_from(["report"]).unwrap();
        assert_eq!(args.command(), Command::All);
        let policy = args.policy().unwrap();
        assert_eq!(policy.results_dir, PathBuf::from("results"));
        assert_eq!(policy.progression, vec![Benchmark::Sjeng]);
        assert_eq!(policy.cost_params.gamma_l1, 2.0);
    }

    #[test]
    fn test_overrides_after_subcommand() {
        let args = EvalArgs::try_parse_from([
            "report",
            "sweep",
            "--progression",
            "specmcf,lbm",
            "--delta",
            "0.1",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.command(), Command::Sweep);
        let policy = args.policy().unwrap();
        assert_eq!(policy.progression, vec![Benchmark::Mcf, Benchmark::Libm]);
        assert_eq!(policy.cost_params.delta, 0.1);
        assert!(policy.verbose);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EvalArgs::try_parse_from(["report", "--progression", "gcc"]).is_err());

        let args = EvalArgs::try_parse_from(["report", "--gamma-l2", "0"]).unwrap();
        assert!(matches!(args.policy(), Err(EvalError::ConfigError(_))));

        let args = EvalArgs::try_parse_from(["report", "--addr-width", "80"]).unwrap();
        assert!(matches!(args.policy(), Err(EvalError::ConfigError(_))));
    }
}
