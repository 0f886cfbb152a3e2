//! A whole problem wrapped up as a single component.

use std::collections::HashSet;

use mf_core::Real;
use mf_system::{Subsystem, SystemError, SystemResult, VarDecl, VarVector};
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::problem::Problem;

/// How a model variable is selected for exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoSpec {
    /// Trailing path segments of a model variable, exposed under that same
    /// string. Must identify exactly one variable.
    Name(String),
    /// Exact absolute model name, exposed as `alias`.
    Aliased { name: String, alias: String },
}

impl From<&str> for IoSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for IoSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<(&str, &str)> for IoSpec {
    fn from((name, alias): (&str, &str)) -> Self {
        Self::Aliased {
            name: name.to_string(),
            alias: alias.to_string(),
        }
    }
}

/// A model variable paired with the name it is exposed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVar {
    pub alias: String,
    pub name: String,
}

fn matches_suffix(var: &str, suffix: &str) -> bool {
    var == suffix
        || var
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.'))
}

/// Resolve `specs` against the names in `model_vars`.
pub fn resolve_model_io(specs: &[IoSpec], model_vars: &VarVector) -> SolverResult<Vec<ResolvedVar>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(specs.len());

    for spec in specs {
        let var = match spec {
            IoSpec::Name(suffix) => {
                let candidates: Vec<String> = model_vars
                    .names()
                    .iter()
                    .filter(|var| matches_suffix(var, suffix))
                    .cloned()
                    .collect();
                match candidates.len() {
                    0 => {
                        return Err(SolverError::UnknownVariable {
                            name: suffix.clone(),
                        });
                    }
                    1 => ResolvedVar {
                        alias: suffix.clone(),
                        name: candidates[0].clone(),
                    },
                    _ => {
                        return Err(SolverError::AmbiguousVariable {
                            name: suffix.clone(),
                            candidates,
                        });
                    }
                }
            }
            IoSpec::Aliased { name, alias } => {
                if !model_vars.contains(name) {
                    return Err(SolverError::UnknownVariable { name: name.clone() });
                }
                ResolvedVar {
                    alias: alias.clone(),
                    name: name.clone(),
                }
            }
        };

        if !seen.insert(var.alias.clone()) {
            return Err(SolverError::DuplicateVariable { name: var.alias });
        }
        resolved.push(var);
    }

    Ok(resolved)
}

/// Component that runs an inner [`Problem`] each time it is evaluated.
///
/// Selected model inputs become the component's inputs and selected model
/// outputs become its outputs. Declared defaults are the model values at the
/// time the subproblem was created.
#[derive(Debug)]
pub struct Subproblem {
    pathname: String,
    problem: Problem,
    inputs: Vec<ResolvedVar>,
    outputs: Vec<ResolvedVar>,
    input_defaults: Vec<Real>,
    output_defaults: Vec<Real>,
}

impl Subproblem {
    pub fn new(problem: Problem, inputs: &[IoSpec], outputs: &[IoSpec]) -> SolverResult<Self> {
        let inputs = resolve_model_io(inputs, problem.inputs())?;
        let outputs = resolve_model_io(outputs, problem.outputs())?;
        let input_defaults = inputs
            .iter()
            .map(|var| problem.get_val(&var.name))
            .collect::<SystemResult<Vec<_>>>()?;
        let output_defaults = outputs
            .iter()
            .map(|var| problem.get_val(&var.name))
            .collect::<SystemResult<Vec<_>>>()?;

        Ok(Self {
            pathname: String::new(),
            problem,
            inputs,
            outputs,
            input_defaults,
            output_defaults,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn exposed_inputs(&self) -> &[ResolvedVar] {
        &self.inputs
    }

    pub fn exposed_outputs(&self) -> &[ResolvedVar] {
        &self.outputs
    }

    fn check_len(&self, what: &'static str, expected: usize, actual: usize) -> SystemResult<()> {
        if expected != actual {
            return Err(SystemError::SizeMismatch {
                system: self.pathname.clone(),
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

fn decls(vars: &[ResolvedVar], defaults: &[Real]) -> Vec<VarDecl> {
    vars.iter()
        .zip(defaults)
        .map(|(var, &default)| VarDecl::new(var.alias.clone(), default))
        .collect()
}

impl Subsystem for Subproblem {
    fn inputs(&self) -> Vec<VarDecl> {
        decls(&self.inputs, &self.input_defaults)
    }

    fn outputs(&self) -> Vec<VarDecl> {
        decls(&self.outputs, &self.output_defaults)
    }

    fn set_pathname(&mut self, pathname: &str) {
        self.pathname = pathname.to_string();
    }

    fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()> {
        self.check_len("inputs", self.inputs.len(), inputs.len())?;
        self.check_len("outputs", self.outputs.len(), outputs.len())?;

        for (var, &value) in self.inputs.iter().zip(inputs.iter()) {
            self.problem.set_val(&var.name, value)?;
        }

        debug!(path = %self.pathname, "running subproblem");
        let outcome = self.problem.run_model()?;
        if outcome.failed {
            return Err(SystemError::NotConverged {
                path: self.pathname.clone(),
            });
        }

        for (var, slot) in self.outputs.iter().zip(outputs.iter_mut()) {
            *slot = self.problem.get_val(&var.name)?;
        }
        Ok(())
    }
}
