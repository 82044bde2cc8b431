//! Step execution.
//!
//! `run` drives an ordered list of steps through pre-check, apply and
//! post-check, collecting failures instead of stopping at the first one.
//! Once any step has failed, later steps are still verified but never
//! applied, because they may depend on the failed step's edits.
//!
//! Nothing is rolled back: edits made by earlier successful steps stay on
//! disk when a later step fails.

use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};
use crate::step::{Phase, Step, StepConfig};

/// What happened to a single step during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Pre-check passed; nothing to do.
    AlreadySatisfied,
    /// Apply and post-check both passed.
    Applied,
    /// Pre-check failed after an earlier step failed; apply not attempted.
    Skipped,
    /// Pre-check failed in verify-only mode.
    CheckFailed,
    /// Apply returned an error.
    ApplyFailed,
    /// Apply succeeded but the step still does not verify.
    PostCheckFailed,
}

impl StepOutcome {
    /// Whether this outcome counts as a failure of the run.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepOutcome::CheckFailed | StepOutcome::ApplyFailed | StepOutcome::PostCheckFailed
        )
    }
}

/// Result of a run: one outcome per step, in order, plus the combined error.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<(String, StepOutcome)>,
    pub result: Result<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Apply,
    CheckOnly,
}

/// Execute a series of steps, with console output.
///
/// Returns `Ok(())` when every step verifies (before or after apply), the
/// wrapped error when exactly one step failed, and `UpdateError::Multiple`
/// otherwise.
pub fn run<S: Step>(steps: &[S], config: &StepConfig) -> Result<()> {
    execute(steps, config, Mode::Apply).result
}

/// Verify every step without applying anything.
pub fn check<S: Step>(steps: &[S], config: &StepConfig) -> Result<()> {
    execute(steps, config, Mode::CheckOnly).result
}

/// Like `run`, but also returns the per-step outcomes.
pub fn run_with_report<S: Step>(steps: &[S], config: &StepConfig) -> RunReport {
    execute(steps, config, Mode::Apply)
}

fn execute<S: Step>(steps: &[S], config: &StepConfig, mode: Mode) -> RunReport {
    let mut failures: Vec<UpdateError> = Vec::new();
    let mut outcomes = Vec::with_capacity(steps.len());

    info!(
        tag = %config.target,
        value = %config.value,
        steps = steps.len(),
        ?mode,
        "starting step run"
    );

    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let name = step.name();
        println!("[{}/{}] {}", i + 1, steps.len(), name);

        let outcome = run_step(step, &name, config, mode, &mut failures);
        debug!(step = %name, ?outcome, "step finished");
        outcomes.push((name, outcome));
    }

    println!();
    let result = UpdateError::from_failures(failures);
    if let Err(e) = &result {
        warn!(failures = e.failure_count(), "step run failed");
    }
    RunReport { outcomes, result }
}

fn run_step<S: Step>(
    step: &S,
    name: &str,
    config: &StepConfig,
    mode: Mode,
    failures: &mut Vec<UpdateError>,
) -> StepOutcome {
    match step.verify(config) {
        Ok(()) => {
            println!("  ✔️ pre-check:  passed");
            return StepOutcome::AlreadySatisfied;
        }
        Err(e) => {
            println!("  ✖️ pre-check:  {}", e);
            if mode == Mode::CheckOnly {
                failures.push(UpdateError::step(name, Phase::PreCheck, e));
                return StepOutcome::CheckFailed;
            }
        }
    }

    if !failures.is_empty() {
        println!("  ⏳ apply:      skipping (previous step failed)");
        return StepOutcome::Skipped;
    }

    if let Err(e) = step.apply(config) {
        println!("  ✖️ apply:      {}", e);
        failures.push(UpdateError::step(name, Phase::Apply, e));
        return StepOutcome::ApplyFailed;
    }
    println!("  ✔️ apply:      successful");

    if let Err(e) = step.verify(config) {
        println!("  ✖️ post-check: {}", e);
        failures.push(UpdateError::step(name, Phase::PostCheck, e));
        return StepOutcome::PostCheckFailed;
    }
    println!("  ✔️ post-check: passed");
    StepOutcome::Applied
}
