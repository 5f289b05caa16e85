use std::fs;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::commands::report::report_generate;
use crate::commands::{AppState, CallerContext, CommandError, CommandResult, Role};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::report::ReportRequest;
use crate::utils::logger::init_logging;

#[derive(Debug, Parser)]
#[command(name = "capaplan")]
#[command(about = "Capacity and commitment planning reports", version)]
pub struct Cli {
    /// YAML configuration file; environment variables override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a capacity report for one organisation.
    Report {
        organisation_id: String,
        /// JSON file holding the report request.
        request: PathBuf,
    },
}

/// Parses arguments without the program name.
pub fn parse_args(args: &[String]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("capaplan").chain(args.iter().map(String::as_str)))
}

/// Runs one CLI invocation and returns what should be printed on success.
pub fn execute(args: &[String]) -> CommandResult<String> {
    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(err.to_string());
        }
        Err(err) => {
            return Err(AppError::validation_with_source("invalid command line", err).into());
        }
    };
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Report {
            organisation_id,
            request,
        } => {
            let raw = fs::read_to_string(&request).map_err(AppError::from)?;
            let request: ReportRequest = serde_json::from_str(&raw)
                .map_err(|err| AppError::validation_with_source("invalid report request", err))?;

            let state = AppState::new(config)?;
            info!(
                target: "app::cli",
                organisation_id = %organisation_id,
                db_path = %state.db().path().display(),
                max_report_days = state.config().max_report_days,
                "generating report"
            );
            // The local operator acts as an administrator of the organisation.
            let caller = CallerContext::new(organisation_id.clone(), vec![Role::Admin]);
            let report = report_generate(&state, &caller, &organisation_id, request)?;
            serde_json::to_string_pretty(&report)
                .map_err(|err| CommandError::from(AppError::from(err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn report(organisation_id: &str, request: &str) -> Command {
        Command::Report {
            organisation_id: organisation_id.into(),
            request: PathBuf::from(request),
        }
    }

    #[test]
    fn report_command_parses_with_and_without_config() {
        let parsed = parse_args(&args(&["report", "o1", "req.json"])).unwrap();
        assert_eq!(parsed.config, None);
        assert_eq!(parsed.command, report("o1", "req.json"));

        let parsed =
            parse_args(&args(&["--config", "cfg.yaml", "report", "o1", "req.json"])).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.yaml")));
    }

    #[test]
    fn config_flag_is_accepted_after_the_subcommand() {
        let parsed =
            parse_args(&args(&["report", "o1", "req.json", "--config", "c.yaml"])).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("c.yaml")));
        assert_eq!(parsed.command, report("o1", "req.json"));
    }

    #[test]
    fn help_and_version_are_printed_instead_of_failing() {
        let error = parse_args(&args(&["--help"])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);

        let help = execute(&args(&["report", "--help"])).unwrap();
        assert!(help.contains("ORGANISATION_ID"), "{help}");

        let version = execute(&args(&["--version"])).unwrap();
        assert!(version.contains(env!("CARGO_PKG_VERSION")), "{version}");
    }

    #[test]
    fn malformed_command_lines_are_validation_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["report", "o1"])).is_err());
        assert!(parse_args(&args(&["export", "o1", "req.json"])).is_err());

        let error = execute(&args(&["report", "o1"])).unwrap_err();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }
}
