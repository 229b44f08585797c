//! Writer/reviewer convergence loop.
//!
//! Each round runs the writer, persists its files, runs the reviewer against
//! what was persisted, appends a dialogue log entry and folds the result into
//! the next [`IterationState`]. The loop stops when the reviewer returns a
//! literal `true` verdict or the iteration cap is reached. Any error ends the
//! whole run; there is no retry.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::agents::reviewer::ReviewerStep;
use crate::agents::writer::WriterStep;
use crate::core::state::{IterationState, RoundUpdate};
use crate::core::tokens::RoundTokens;
use crate::core::types::Role;
use crate::io::agent::Agent;
use crate::io::config::RunConfig;
use crate::io::context::AgentContext;
use crate::io::dialogue_log::{DialogueEntry, append_entry};
use crate::io::prompt::PromptTemplates;
use crate::io::task::TaskDescription;

/// Static inputs shared by every round, plus one agent per role.
pub struct LoopContext<'a, W, R> {
    pub config: &'a RunConfig,
    pub task: &'a TaskDescription,
    pub context: &'a AgentContext,
    pub templates: &'a PromptTemplates,
    pub writer: &'a W,
    pub reviewer: &'a R,
}

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// The reviewer accepted the document.
    Complete,
    /// `max_iterations` rounds ran without an accepting verdict.
    Capped { max_iterations: u32 },
}

/// Summary of one finished round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub iteration: u32,
    pub primary_path: PathBuf,
    pub secondary_paths: Vec<PathBuf>,
    pub feedback: String,
    pub complete: bool,
    pub tokens: RoundTokens,
    pub total_tokens: u64,
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub stop: LoopStop,
    pub rounds: u32,
    pub primary_path: PathBuf,
    pub secondary_paths: Vec<PathBuf>,
    pub feedback: String,
    pub total_tokens: u64,
}

impl LoopOutcome {
    fn from_state(stop: LoopStop, state: IterationState) -> Self {
        Self {
            stop,
            rounds: state.rounds_completed(),
            primary_path: state.primary_path,
            secondary_paths: state.secondary_paths,
            feedback: state.feedback,
            total_tokens: state.total_tokens,
        }
    }
}

/// Run one writer + reviewer round and return the next state.
#[instrument(skip_all, fields(iteration = state.iteration))]
pub fn run_round<W: Agent, R: Agent>(
    ctx: &LoopContext<'_, W, R>,
    state: IterationState,
) -> Result<(IterationState, RoundReport)> {
    let writer_step = WriterStep {
        config: ctx.config,
        task: ctx.task,
        context: ctx.context,
        template: ctx.templates.for_role(Role::Writer),
    };
    let written = writer_step.run(ctx.writer, &state)?;

    let reviewer_step = ReviewerStep {
        config: ctx.config,
        context: ctx.context,
        template: ctx.templates.for_role(Role::Reviewer),
    };
    let reviewed = reviewer_step.run(
        ctx.reviewer,
        &written.primary_path,
        &written.secondary_paths,
    )?;

    let tokens = RoundTokens {
        writer: written.tokens,
        reviewer: reviewed.tokens,
    };
    let iteration = state.iteration;
    let next = state.advance(RoundUpdate {
        primary_path: written.primary_path.clone(),
        secondary_paths: written.secondary_paths.clone(),
        feedback: reviewed.feedback().to_string(),
        complete: reviewed.is_complete(),
        tokens,
    });

    append_entry(
        &ctx.config.dialogue_log_path(),
        &DialogueEntry {
            iteration,
            primary_path: &written.primary_path,
            writer: &written.output,
            reviewer: &reviewed.output,
            tokens,
            total_tokens: next.total_tokens,
        },
    )?;

    info!(
        complete = next.complete,
        round_tokens = tokens.total(),
        total_tokens = next.total_tokens,
        "round finished"
    );
    let report = RoundReport {
        iteration,
        primary_path: written.primary_path,
        secondary_paths: written.secondary_paths,
        feedback: next.feedback.clone(),
        complete: next.complete,
        tokens,
        total_tokens: next.total_tokens,
    };
    Ok((next, report))
}

/// Run rounds until the reviewer accepts or `max_iterations` is reached.
///
/// Reaching the cap is not an error; it is reported as [`LoopStop::Capped`].
pub fn run_loop<W: Agent, R: Agent, F: FnMut(&RoundReport)>(
    ctx: &LoopContext<'_, W, R>,
    mut on_round: F,
) -> Result<LoopOutcome> {
    let max_iterations = ctx.config.max_iterations;
    let mut state = IterationState::new(ctx.config.default_primary_path());

    loop {
        if state.iteration > max_iterations {
            warn!(
                max_iterations,
                "iteration cap reached without an accepting verdict"
            );
            return Ok(LoopOutcome::from_state(
                LoopStop::Capped { max_iterations },
                state,
            ));
        }

        let (next, report) = run_round(ctx, state)?;
        on_round(&report);
        state = next;

        if state.complete {
            info!(rounds = state.rounds_completed(), "reviewer accepted the document");
            return Ok(LoopOutcome::from_state(LoopStop::Complete, state));
        }
    }
}
