//! Root of a model: owns the vectors every subsystem reads and writes.

use mf_core::Real;
use mf_system::{Subsystem, SystemError, SystemResult, VarVector};
use tracing::info;

use crate::group::Group;
use crate::solver::{SolveOutcome, SolveProgressEvent};

/// A model ready to run.
///
/// Holds the root [`Group`] and the root input/output vectors. Variable
/// names are absolute dotted paths such as `cycle.c0.y`.
#[derive(Debug)]
pub struct Problem {
    model: Group,
    inputs: VarVector,
    outputs: VarVector,
}

impl Problem {
    /// Place `model` at the root and allocate its vectors from the declared
    /// defaults.
    pub fn new(mut model: Group) -> SystemResult<Self> {
        model.set_pathname("");
        let inputs = VarVector::from_decls(&model.inputs())?;
        let outputs = VarVector::from_decls(&model.outputs())?;
        info!(
            children = model.system().len(),
            inputs = inputs.len(),
            outputs = outputs.len(),
            solver = model.solver_name(),
            "problem set up"
        );
        Ok(Self {
            model,
            inputs,
            outputs,
        })
    }

    pub fn model(&self) -> &Group {
        &self.model
    }

    pub fn inputs(&self) -> &VarVector {
        &self.inputs
    }

    pub fn outputs(&self) -> &VarVector {
        &self.outputs
    }

    /// Set an output or, failing that, an input.
    pub fn set_val(&mut self, name: &str, value: Real) -> SystemResult<()> {
        if self.outputs.contains(name) {
            self.outputs.set(name, value)
        } else {
            self.inputs.set(name, value)
        }
    }

    /// Read an output or, failing that, an input.
    pub fn get_val(&self, name: &str) -> SystemResult<Real> {
        self.outputs
            .get(name)
            .or_else(|| self.inputs.get(name))
            .ok_or_else(|| SystemError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Run the root solver once over the whole model.
    pub fn run_model(&mut self) -> SystemResult<SolveOutcome> {
        self.run_model_with_progress(None)
    }

    /// Like [`Problem::run_model`], reporting the root's children to
    /// `progress`.
    pub fn run_model_with_progress(
        &mut self,
        progress: Option<&mut dyn FnMut(SolveProgressEvent)>,
    ) -> SystemResult<SolveOutcome> {
        let Self {
            model,
            inputs,
            outputs,
        } = self;
        model.solve_with_progress(inputs.values_mut(), outputs.values_mut(), progress)
    }
}
