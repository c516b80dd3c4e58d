use std::process::ExitCode;

pub fn main() -> ExitCode {
    sancov_counters::cli::main()
}
