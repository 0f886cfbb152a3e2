//! The contract every node of a model tree implements.

use mf_core::Real;

use crate::error::SystemResult;
use crate::vector::VarDecl;

/// A node of the model hierarchy: a leaf component or a nested group.
///
/// Storage lives at the root of the tree. When a subsystem is evaluated it is
/// handed the contiguous slices of the root vectors that hold its own
/// variables, in the order given by [`Subsystem::inputs`] and
/// [`Subsystem::outputs`].
pub trait Subsystem: Send {
    /// Input declarations, names relative to this subsystem.
    fn inputs(&self) -> Vec<VarDecl>;

    /// Output declarations, names relative to this subsystem.
    fn outputs(&self) -> Vec<VarDecl>;

    /// Called once the subsystem's position in the tree is known.
    fn set_pathname(&mut self, _pathname: &str) {}

    /// Run this subsystem's own nonlinear evaluation.
    ///
    /// `inputs` and `outputs` have exactly the lengths of the declarations.
    fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()>;
}

/// Join a parent path and a child name (`""` is the root).
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}
