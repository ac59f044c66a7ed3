//! storycrew CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Configuration error (missing MODEL or API key, bad crew config)
//! - 3: Validation failure (keyword record rejected)
//! - 4: LLM error

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};
use crew_agents::AgentError;
use crew_core::CoreError;
use crew_llm::LlmError;
use crew_spec::{SpecError, ValidationError};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const LLM_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so .env values can feed `env = ...` arguments
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring .env file: {}", e),
    }

    let result = match cli.command {
        Some(Commands::Run(args)) => commands::run::execute(args).await,
        Some(Commands::ValidateKeywords(args)) => commands::validate_keywords::execute(args).await,
        None => commands::run::execute(cli.run).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn log_directives(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "storycrew=debug,crew_=debug,warn"
    } else if quiet {
        "warn"
    } else {
        "storycrew=info,crew_=info,warn"
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbose, quiet)));

    // Logging may already be initialized; ignore
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<ValidationError>().is_some() {
            return ExitCodes::VALIDATION_FAILURE;
        }
        if cause.downcast_ref::<SpecError>().is_some() {
            return ExitCodes::VALIDATION_FAILURE;
        }
        if let Some(err) = cause.downcast_ref::<LlmError>() {
            return categorize_llm_error(err);
        }
        if let Some(err) = cause.downcast_ref::<AgentError>() {
            return categorize_agent_error(err);
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            if let CoreError::DependencyNotSatisfied { .. } = err {
                return ExitCodes::CONFIG_ERROR;
            }
            if let Some(agent) = err.stage_error().and_then(|e| e.downcast_ref::<AgentError>()) {
                return categorize_agent_error(agent);
            }
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn categorize_llm_error(err: &LlmError) -> u8 {
    if err.is_configuration() {
        ExitCodes::CONFIG_ERROR
    } else {
        ExitCodes::LLM_ERROR
    }
}

fn categorize_agent_error(err: &AgentError) -> u8 {
    match err {
        AgentError::Spec(_) => ExitCodes::VALIDATION_FAILURE,
        AgentError::Llm(inner) => categorize_llm_error(inner),
        err if err.is_configuration() => ExitCodes::CONFIG_ERROR,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn stage_failure(err: AgentError) -> anyhow::Error {
        anyhow::Error::new(CoreError::StageFailed {
            stage: "keywords_task".to_string(),
            source: Box::new(CoreError::stage(err)),
        })
    }

    #[test]
    fn test_validation_failure_in_stage() {
        let err = stage_failure(AgentError::Spec(SpecError::Validation(
            ValidationError::EmptyPrimaryKeywords,
        )));
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
        assert!(format!("{:#}", err).contains("primary_keywords"));
    }

    #[test]
    fn test_validation_failure_direct() {
        let err = anyhow::Error::new(SpecError::NoStructuredOutput).context("Checking record");
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_llm_errors() {
        let err = stage_failure(AgentError::Llm(LlmError::Api {
            provider: "gemini".to_string(),
            status: 500,
            body: String::new(),
        }));
        assert_eq!(categorize_error(&err), ExitCodes::LLM_ERROR);

        let err = anyhow::Error::new(LlmError::MissingEnv("GEMINI_API_KEY".to_string()))
            .context("Failed to configure the LLM");
        assert_eq!(categorize_error(&err), ExitCodes::CONFIG_ERROR);
    }

    #[test]
    fn test_config_errors() {
        let err = anyhow::Error::new(AgentError::TaskNotFound("report_task".to_string()));
        assert_eq!(categorize_error(&err), ExitCodes::CONFIG_ERROR);

        let err = anyhow::Error::new(CoreError::DependencyNotSatisfied {
            stage: "kickoff_task".to_string(),
            key: "topic".to_string(),
        });
        assert_eq!(categorize_error(&err), ExitCodes::CONFIG_ERROR);
    }

    #[test]
    fn test_general_error() {
        let err: anyhow::Error = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            .context("Writing report")
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_log_directives() {
        assert_eq!(log_directives(false, false), "storycrew=info,crew_=info,warn");
        assert!(log_directives(true, false).contains("crew_=debug"));
        assert_eq!(log_directives(false, true), "warn");
    }
}
