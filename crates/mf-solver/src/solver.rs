//! Nonlinear solver contract.

use mf_core::Real;
use mf_system::{System, SystemResult};

/// What a nonlinear solve reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOutcome {
    /// True if the solver failed to converge.
    pub failed: bool,
    pub abs_error: Real,
    pub rel_error: Real,
}

impl SolveOutcome {
    /// Non-failure with zero error.
    pub const fn success() -> Self {
        Self {
            failed: false,
            abs_error: 0.0,
            rel_error: 0.0,
        }
    }
}

/// Emitted once per child visited by a solver pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveProgressEvent {
    pub index: usize,
    pub pathname: String,
    /// Whether the child is evaluated by this execution context.
    pub local: bool,
}

/// A strategy for solving the nonlinear problem posed by one system.
///
/// The system is passed explicitly along with its input and output vectors;
/// solvers keep no reference to the system between calls.
pub trait NonlinearSolver: Send {
    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;

    /// Solve, reporting each visited child to `progress`.
    fn solve_with_progress(
        &mut self,
        system: &mut System,
        inputs: &mut [Real],
        outputs: &mut [Real],
        progress: Option<&mut dyn FnMut(SolveProgressEvent)>,
    ) -> SystemResult<SolveOutcome>;

    fn solve(
        &mut self,
        system: &mut System,
        inputs: &mut [Real],
        outputs: &mut [Real],
    ) -> SystemResult<SolveOutcome> {
        self.solve_with_progress(system, inputs, outputs, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_zero_error() {
        let outcome = SolveOutcome::success();
        assert!(!outcome.failed);
        assert_eq!(outcome.abs_error, 0.0);
        assert_eq!(outcome.rel_error, 0.0);
    }
}
