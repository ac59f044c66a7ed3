//! Validate-keywords command - Check a keyword record offline.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crew_spec::parse_keyword_spec;

#[derive(Args, Debug)]
pub struct ValidateKeywordsArgs {
    /// File with the keyword record (JSON or LLM text containing it), `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,
}

pub async fn execute(args: ValidateKeywordsArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let spec = parse_keyword_spec(&text)?;

    info!(
        "Keyword record is valid: {} primary, {} secondary",
        spec.primary_keywords().len(),
        spec.secondary_keywords().len()
    );
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read keyword record from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
