//! Leaf components.

use mf_core::{MfError, Real, ensure_finite};

use crate::error::{SystemError, SystemResult};
use crate::subsystem::{Subsystem, join_path};
use crate::vector::VarDecl;

/// Default value given to declared variables.
pub const DEFAULT_VALUE: Real = 1.0;

/// `output = Σ coefficients[i] * inputs[i] + offset`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearComponent {
    pathname: String,
    inputs: Vec<String>,
    output: String,
    coefficients: Vec<Real>,
    offset: Real,
}

impl LinearComponent {
    pub fn new(
        inputs: Vec<String>,
        output: impl Into<String>,
        coefficients: Vec<Real>,
        offset: Real,
    ) -> SystemResult<Self> {
        if inputs.len() != coefficients.len() {
            return Err(MfError::InvalidArg {
                what: "coefficient count must match input count",
            }
            .into());
        }
        for &c in coefficients.iter().chain(std::iter::once(&offset)) {
            ensure_finite(c, "linear coefficient")?;
        }
        Ok(Self {
            pathname: String::new(),
            inputs,
            output: output.into(),
            coefficients,
            offset,
        })
    }

    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    pub fn offset(&self) -> Real {
        self.offset
    }
}

impl Subsystem for LinearComponent {
    fn inputs(&self) -> Vec<VarDecl> {
        self.inputs
            .iter()
            .map(|name| VarDecl::new(name.clone(), DEFAULT_VALUE))
            .collect()
    }

    fn outputs(&self) -> Vec<VarDecl> {
        vec![VarDecl::new(self.output.clone(), DEFAULT_VALUE)]
    }

    fn set_pathname(&mut self, pathname: &str) {
        self.pathname = pathname.to_string();
    }

    fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()> {
        let y = self
            .coefficients
            .iter()
            .zip(inputs.iter())
            .map(|(c, x)| c * x)
            .sum::<Real>()
            + self.offset;

        let y = ensure_finite(y, join_path(&self.pathname, &self.output)).map_err(|e| {
            SystemError::Evaluation {
                path: self.pathname.clone(),
                message: e.to_string(),
            }
        })?;
        let slot = outputs.first_mut().ok_or(MfError::IndexOob {
            what: "linear output",
            index: 0,
            len: 0,
        })?;
        *slot = y;
        Ok(())
    }
}

type EvalFn = Box<dyn FnMut(&[Real], &mut [Real]) -> Result<(), String> + Send>;

/// Closure-backed component for ad-hoc models.
///
/// A closure error becomes [`SystemError::Evaluation`] tagged with the
/// component's path.
pub struct FnComponent {
    pathname: String,
    inputs: Vec<VarDecl>,
    outputs: Vec<VarDecl>,
    eval: EvalFn,
}

impl FnComponent {
    pub fn new<F>(inputs: Vec<VarDecl>, outputs: Vec<VarDecl>, eval: F) -> Self
    where
        F: FnMut(&[Real], &mut [Real]) -> Result<(), String> + Send + 'static,
    {
        Self {
            pathname: String::new(),
            inputs,
            outputs,
            eval: Box::new(eval),
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }
}

impl std::fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnComponent")
            .field("pathname", &self.pathname)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl Subsystem for FnComponent {
    fn inputs(&self) -> Vec<VarDecl> {
        self.inputs.clone()
    }

    fn outputs(&self) -> Vec<VarDecl> {
        self.outputs.clone()
    }

    fn set_pathname(&mut self, pathname: &str) {
        self.pathname = pathname.to_string();
    }

    fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()> {
        (self.eval)(inputs, outputs).map_err(|message| SystemError::Evaluation {
            path: self.pathname.clone(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_evaluates_weighted_sum() {
        let mut comp =
            LinearComponent::new(vec!["a".into(), "b".into()], "y", vec![2.0, -1.0], 0.5)
                .unwrap();
        let mut inputs = [3.0, 4.0];
        let mut outputs = [0.0];
        comp.solve_nonlinear(&mut inputs, &mut outputs).unwrap();
        assert_eq!(outputs[0], 2.5);
    }

    #[test]
    fn linear_rejects_coefficient_mismatch() {
        let err = LinearComponent::new(vec!["a".into()], "y", vec![1.0, 2.0], 0.0).unwrap_err();
        assert!(matches!(err, SystemError::Core(MfError::InvalidArg { .. })));
    }

    #[test]
    fn linear_overflow_is_evaluation_error() {
        let mut comp = LinearComponent::new(vec!["a".into()], "y", vec![1e308], 0.0).unwrap();
        comp.set_pathname("sub.lin");
        let mut outputs = [0.0];
        let err = comp.solve_nonlinear(&mut [1e308], &mut outputs).unwrap_err();
        match err {
            SystemError::Evaluation { path, message } => {
                assert_eq!(path, "sub.lin");
                assert!(message.contains("sub.lin.y"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(outputs[0], 0.0);
    }

    #[test]
    fn fn_component_error_carries_path() {
        let mut comp = FnComponent::new(
            vec![VarDecl::new("x", 0.0)],
            vec![VarDecl::new("y", 0.0)],
            |_, _| Err("diverged".to_string()),
        );
        comp.set_pathname("c1");
        let err = comp.solve_nonlinear(&mut [0.0], &mut [0.0]).unwrap_err();
        assert_eq!(
            err,
            SystemError::Evaluation {
                path: "c1".into(),
                message: "diverged".into()
            }
        );
    }
}
