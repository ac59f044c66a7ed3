//! Run command - Execute the content crew.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use tracing::info;

use crew_agents::{ContentCrew, CrewConfig};
use crew_core::RunLog;
use crew_llm::{LlmAdapter, LlmClient};

/// Topic used when neither `--topic` nor `TOPIC` is given.
pub const DEFAULT_TOPIC: &str = "The future of AI in rural healthcare";

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Topic of the content
    #[arg(short, long, env = "TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Additional guidance for the kickoff agent
    #[arg(short, long, default_value = "")]
    pub brief: String,

    /// Directory that receives the report
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory with agents.yaml and tasks.yaml overriding the built-in crew
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let llm = LlmAdapter::from_env().context("Failed to configure the LLM")?;
    info!("Using model {}/{}", llm.provider(), llm.model());

    let config = match &args.config_dir {
        Some(dir) => CrewConfig::load(dir)
            .with_context(|| format!("Failed to load crew configuration from {}", dir.display()))?,
        None => CrewConfig::builtin()?,
    };

    let crew = ContentCrew::new(&config, Arc::new(llm), &args.output_dir)?;
    let run_timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    info!("Running content crew on topic: {}", args.topic);
    let (log, outcome) = crew
        .kickoff_logged([
            ("topic", args.topic.as_str()),
            ("manager_brief", args.brief.as_str()),
            ("run_timestamp", run_timestamp.as_str()),
        ])
        .await;

    print_summary(&log);
    outcome?;

    println!();
    println!("=== FINAL REPORT (path: {}) ===", crew.report_path().display());
    println!();
    println!(
        "{}",
        log.final_output().map(|o| o.raw.as_str()).unwrap_or_default()
    );

    Ok(())
}

fn print_summary(log: &RunLog) {
    println!("📋 {} (run {})", log.pipeline_name, log.context.run_id);

    for result in &log.results {
        let icon = if result.skipped {
            "⏭️ "
        } else if result.success {
            "✅"
        } else {
            "❌"
        };
        let elapsed = (result.completed_at - result.started_at).num_milliseconds() as f64 / 1000.0;
        println!(
            "   {} {:<14} {:>6.1}s  {}",
            icon,
            result.stage,
            elapsed,
            result.message.as_deref().unwrap_or_default()
        );
        for artifact in &result.artifacts {
            println!("      📄 {}", artifact.path.display());
        }
    }

    if let Some(duration) = log.duration() {
        println!(
            "   Finished in {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
}
