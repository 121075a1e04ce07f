use std::process;

use clap::Parser;
use eval_lib::config::init_logging;
use eval_lib::error::EvalResult;
use eval_lib::flags::{Command, EvalArgs};
use eval_lib::run_wrapper;

fn main() {
    let args = EvalArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &EvalArgs) -> EvalResult<()> {
    let policy = args.policy()?;

    match args.command() {
        Command::Baseline => {
            run_wrapper::run_baseline(&policy)?;
        }
        Command::Sweep => {
            run_wrapper::run_sweep(&policy)?;
        }
        Command::Cost => {
            run_wrapper::run_cost(&policy)?;
        }
        Command::Collect => {
            let written = run_wrapper::run_collect(&policy)?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Command::All => {
            let report = run_wrapper::run_all(&policy)?;
            let failed = report.baseline.failed.len()
                + report.sweep.as_ref().map_or(0, |s| s.failed.len())
                + report.cost.charts.failed.len();
            if failed > 0 {
                log::warn!("{} charts could not be drawn", failed);
            }
        }
    }

    Ok(())
}
