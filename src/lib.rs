pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::process::ExitCode;

/// Entry point of the `capaplan` binary. The result goes to stdout; failures
/// are written to stderr as a JSON command error.
pub fn run() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::execute(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let rendered = serde_json::to_string(&error)
                .unwrap_or_else(|_| format!("{}: {}", error.code, error.message));
            eprintln!("{rendered}");
            ExitCode::FAILURE
        }
    }
}
