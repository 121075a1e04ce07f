use std::process;

use eval_lib::config::{init_logging, EvalPolicy};
use eval_lib::error::EvalResult;
use eval_lib::run_wrapper::run_sweep;

fn main() {
    init_logging(false);
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> EvalResult<()> {
    let report = run_sweep(&EvalPolicy::default())?;
    for (path, reason) in &report.failed {
        eprintln!("Skipped {}: {}", path.display(), reason);
    }
    for path in &report.written {
        println!("{}", path.display());
    }
    Ok(())
}
