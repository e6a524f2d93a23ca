use std::process::ExitCode;

fn main() -> ExitCode {
    xsell_cli::run()
}
