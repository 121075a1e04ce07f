use std::process;

use eval_lib::config::{init_logging, EvalPolicy};
use eval_lib::cost::best_optimized;
use eval_lib::error::EvalResult;
use eval_lib::run_wrapper::run_cost;

fn main() {
    init_logging(false);
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> EvalResult<()> {
    let report = run_cost(&EvalPolicy::default())?;
    if let Some(best) = best_optimized(&report.records) {
        log::info!(
            "Most cost-efficient: {} at CPI×Cost {:.0}",
            best.benchmark,
            best.cost_performance
        );
    }
    println!("{}", report.csv.display());
    Ok(())
}
