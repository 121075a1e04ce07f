use std::process;

use eval_lib::config::{init_logging, EvalPolicy};
use eval_lib::error::EvalResult;
use eval_lib::run_wrapper::run_baseline;

fn main() {
    init_logging(false);
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> EvalResult<()> {
    let report = run_baseline(&EvalPolicy::default())?;
    for path in &report.written {
        println!("{}", path.display());
    }
    Ok(())
}
