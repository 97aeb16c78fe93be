//! plugreg - inspect and simulate plugin registries

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = plugreg::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
