//! CLI command definitions.
//!
//! Running `storycrew` without a subcommand is the same as `storycrew run`.

use clap::{Parser, Subcommand};

pub mod run;
pub mod validate_keywords;

/// storycrew - multi-agent content pipeline
#[derive(Parser, Debug)]
#[command(name = "storycrew")]
#[command(version, about = "storycrew - multi-agent content pipeline")]
#[command(long_about = r#"
storycrew runs a crew of LLM agents in sequence to produce a content report:

  kickoff → keywords → story → evaluation → report

The keyword stage must return a valid keyword plan; an invalid one
stops the run.

ENVIRONMENT (a .env file in the working directory is loaded first):
  MODEL           provider/model, e.g. gemini/gemini-2.0-flash (required)
  GEMINI_API_KEY  API key for Gemini models (OPENAI_API_KEY, ANTHROPIC_API_KEY
                  for the other providers)
  TOPIC           topic of the run

EXIT CODES:
  0 - Success
  1 - General error
  2 - Configuration error
  3 - Validation failure
  4 - LLM error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: run::RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the content crew (default)
    Run(run::RunArgs),

    /// Validate a keyword record and print its normalized form
    #[command(name = "validate-keywords")]
    ValidateKeywords(validate_keywords::ValidateKeywordsArgs),
}
