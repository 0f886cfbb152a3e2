//! A system paired with the solver that drives it.

use mf_core::Real;
use mf_system::{Subsystem, System, SystemError, SystemResult, VarDecl};

use crate::run_once::RunOnce;
use crate::solver::{NonlinearSolver, SolveOutcome, SolveProgressEvent};

/// A [`System`] together with its nonlinear solver.
///
/// A group is itself a [`Subsystem`], so groups nest: evaluating a group
/// means running its solver over the slices it is handed.
pub struct Group {
    system: System,
    solver: Box<dyn NonlinearSolver>,
}

impl Group {
    /// Group driven by [`RunOnce`].
    pub fn new(system: System) -> Self {
        Self::with_solver(system, RunOnce::new())
    }

    pub fn with_solver(system: System, solver: impl NonlinearSolver + 'static) -> Self {
        Self {
            system,
            solver: Box::new(solver),
        }
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    pub fn solve(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<SolveOutcome> {
        self.solver.solve(&mut self.system, inputs, outputs)
    }

    pub fn solve_with_progress(
        &mut self,
        inputs: &mut [Real],
        outputs: &mut [Real],
        progress: Option<&mut dyn FnMut(SolveProgressEvent)>,
    ) -> SystemResult<SolveOutcome> {
        self.solver.solve_with_progress(&mut self.system, inputs, outputs, progress)
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("system", &self.system)
            .field("solver", &self.solver.name())
            .finish()
    }
}

impl Subsystem for Group {
    fn inputs(&self) -> Vec<VarDecl> {
        self.system.input_decls().to_vec()
    }

    fn outputs(&self) -> Vec<VarDecl> {
        self.system.output_decls().to_vec()
    }

    fn set_pathname(&mut self, pathname: &str) {
        self.system.set_pathname(pathname);
    }

    fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()> {
        let outcome = self.solve(inputs, outputs)?;
        if outcome.failed {
            return Err(SystemError::NotConverged {
                path: self.system.pathname().to_string(),
            });
        }
        Ok(())
    }
}
