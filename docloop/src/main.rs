//! Writer/reviewer documentation loop.
//!
//! Reads a run configuration, assembles static context once, then alternates
//! writer and reviewer agents until the reviewer accepts the document or the
//! iteration cap is reached.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use docloop::core::types::Role;
use docloop::exit_codes;
use docloop::io::agent::CommandAgent;
use docloop::io::config::{DEFAULT_CONFIG_PATH, RunConfig, TokenReport, load_config};
use docloop::io::context::AgentContext;
use docloop::io::prompt::PromptTemplates;
use docloop::io::task::{TaskDescription, load_task};
use docloop::logging;
use docloop::looping::{LoopContext, LoopOutcome, LoopStop, RoundReport, run_loop};

#[derive(Parser)]
#[command(
    name = "docloop",
    version,
    about = "Writer/reviewer agent loop that converges on a documentation file"
)]
struct Cli {
    /// Run configuration (TOML, or JSON when the extension is `.json`).
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override `max_iterations` from the config.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Override the output directory (takes precedence over the task file).
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let task = match &config.task_file {
        Some(path) => load_task(path)?,
        None => TaskDescription::default(),
    };
    let config = apply_task_and_overrides(config, &task, &cli)?;

    let context = AgentContext::assemble(&config);
    let templates = PromptTemplates::load(&config);
    let writer = CommandAgent::new(Role::Writer, &config.agent, config.writer_model.as_deref());
    let reviewer = CommandAgent::new(
        Role::Reviewer,
        &config.agent,
        config.reviewer_model.as_deref(),
    );

    let ctx = LoopContext {
        config: &config,
        task: &task,
        context: &context,
        templates: &templates,
        writer: &writer,
        reviewer: &reviewer,
    };
    let outcome = run_loop(&ctx, |report| {
        if config.token_report == TokenReport::EachRound {
            print_round(report);
        }
    })?;
    print_outcome(&outcome);
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    load_config(&cli.config).context("load run configuration")
}

/// Task directory overrides the config; CLI flags override both.
fn apply_task_and_overrides(
    mut config: RunConfig,
    task: &TaskDescription,
    cli: &Cli,
) -> Result<RunConfig> {
    config.apply_task(task);
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_round(report: &RoundReport) {
    println!(
        "round {}: writer={} reviewer={} total={} complete={}",
        report.iteration,
        report.tokens.writer.total(),
        report.tokens.reviewer.total(),
        report.total_tokens,
        report.complete
    );
}

fn print_outcome(outcome: &LoopOutcome) {
    let status = match outcome.stop {
        LoopStop::Complete => "complete",
        LoopStop::Capped { max_iterations } => {
            println!(
                "warning: reached max_iterations={max_iterations} without reviewer approval; last feedback: {}",
                outcome.feedback
            );
            "capped"
        }
    };
    println!(
        "status={} rounds={} tokens={} main={}",
        status,
        outcome.rounds,
        outcome.total_tokens,
        outcome.primary_path.display()
    );
}
