use std::process::ExitCode;

fn main() -> ExitCode {
    capaplan_lib::run()
}
