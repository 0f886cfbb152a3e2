//! Single-pass nonlinear solver.

use mf_core::Real;
use mf_system::{Direction, System, SystemResult};
use tracing::debug;

use crate::solver::{NonlinearSolver, SolveOutcome, SolveProgressEvent};

/// Runs the owning system once, with no iteration and no norm computation.
///
/// For every child in order: forward transfer into the child, then the
/// child's own nonlinear evaluation when it is locally owned. Transfers run
/// for every child, local or not, so that every execution context walks the
/// same sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOnce;

impl RunOnce {
    pub const SOLVER: &'static str = "NL: RUNONCE";

    pub fn new() -> Self {
        Self
    }
}

impl NonlinearSolver for RunOnce {
    fn name(&self) -> &'static str {
        Self::SOLVER
    }

    /// Any transfer or evaluation error is returned as is and stops the pass.
    fn solve_with_progress(
        &mut self,
        system: &mut System,
        inputs: &mut [Real],
        outputs: &mut [Real],
        mut progress: Option<&mut dyn FnMut(SolveProgressEvent)>,
    ) -> SystemResult<SolveOutcome> {
        system.check_sizes(inputs.len(), outputs.len())?;

        for (index, child, transfer) in system.steps_mut() {
            debug!(solver = Self::SOLVER, "subsystem: {}", child.pathname());
            if let Some(cb) = progress.as_deref_mut() {
                cb(SolveProgressEvent {
                    index,
                    pathname: child.pathname().to_string(),
                    local: child.is_local(),
                });
            }

            transfer.transfer(inputs, outputs, Direction::Fwd)?;

            if child.is_local() {
                child.solve_nonlinear(inputs, outputs)?;
            }
        }

        Ok(SolveOutcome::success())
    }
}
