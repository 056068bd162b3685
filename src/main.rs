use std::env;
use std::process;

use chassis_ledger::cli::run_with_args;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    process::exit(run_with_args(&args));
}
