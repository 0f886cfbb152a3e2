//! Hierarchical system: ordered children, their layout and their transfers.

use std::ops::Range;

use mf_core::Real;

use crate::error::{SystemError, SystemResult};
use crate::subsystem::{Subsystem, join_path};
use crate::transfer::{Direction, Transfer, TransferTable};
use crate::vector::VarDecl;

/// A direct child of a [`System`].
pub struct Child {
    pub(crate) name: String,
    pub(crate) pathname: String,
    pub(crate) subsystem: Box<dyn Subsystem>,
    pub(crate) local: bool,
    pub(crate) input_range: Range<usize>,
    pub(crate) output_range: Range<usize>,
}

impl Child {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Whether this execution context evaluates the child.
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Slots of the child's inputs in the owning system's input vector.
    pub fn input_range(&self) -> Range<usize> {
        self.input_range.clone()
    }

    /// Slots of the child's outputs in the owning system's output vector.
    pub fn output_range(&self) -> Range<usize> {
        self.output_range.clone()
    }

    pub fn subsystem(&self) -> &dyn Subsystem {
        self.subsystem.as_ref()
    }

    pub fn subsystem_mut(&mut self) -> &mut dyn Subsystem {
        self.subsystem.as_mut()
    }

    /// Evaluate the child on its own slices of the owning system's vectors.
    pub fn solve_nonlinear(&mut self, inputs: &mut [Real], outputs: &mut [Real]) -> SystemResult<()> {
        let in_len = inputs.len();
        let out_len = outputs.len();
        let child_inputs = inputs
            .get_mut(self.input_range.clone())
            .ok_or_else(|| SystemError::SizeMismatch {
                system: self.pathname.clone(),
                what: "inputs",
                expected: self.input_range.end,
                actual: in_len,
            })?;
        let child_outputs = outputs
            .get_mut(self.output_range.clone())
            .ok_or_else(|| SystemError::SizeMismatch {
                system: self.pathname.clone(),
                what: "outputs",
                expected: self.output_range.end,
                actual: out_len,
            })?;
        self.subsystem.solve_nonlinear(child_inputs, child_outputs)
    }
}

impl std::fmt::Debug for Child {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Child")
            .field("name", &self.name)
            .field("pathname", &self.pathname)
            .field("local", &self.local)
            .field("input_range", &self.input_range)
            .field("output_range", &self.output_range)
            .finish_non_exhaustive()
    }
}

/// A validated, structurally frozen system.
///
/// Built with [`crate::SystemBuilder`]. The input and output vectors of the
/// system are the concatenation of its children's vectors in child order;
/// variable names are `child.var`.
#[derive(Debug)]
pub struct System {
    pub(crate) pathname: String,
    pub(crate) children: Vec<Child>,
    pub(crate) transfers: TransferTable,
    pub(crate) input_decls: Vec<VarDecl>,
    pub(crate) output_decls: Vec<VarDecl>,
}

impl System {
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Place the system in the tree; child paths follow.
    pub fn set_pathname(&mut self, pathname: &str) {
        self.pathname = pathname.to_string();
        for child in &mut self.children {
            child.pathname = join_path(pathname, &child.name);
            child.subsystem.set_pathname(&child.pathname);
        }
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children evaluated by this execution context, in order.
    pub fn local_children(&self) -> impl Iterator<Item = &Child> + '_ {
        self.children.iter().filter(|c| c.local)
    }

    pub fn input_len(&self) -> usize {
        self.input_decls.len()
    }

    pub fn output_len(&self) -> usize {
        self.output_decls.len()
    }

    pub fn input_decls(&self) -> &[VarDecl] {
        &self.input_decls
    }

    pub fn output_decls(&self) -> &[VarDecl] {
        &self.output_decls
    }

    pub fn transfers(&self) -> &TransferTable {
        &self.transfers
    }

    /// Check that vectors handed to a solve match this system's layout.
    pub fn check_sizes(&self, inputs_len: usize, outputs_len: usize) -> SystemResult<()> {
        for (what, expected, actual) in [
            ("inputs", self.input_len(), inputs_len),
            ("outputs", self.output_len(), outputs_len),
        ] {
            if expected != actual {
                return Err(SystemError::SizeMismatch {
                    system: self.pathname.clone(),
                    what,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Apply the transfer of one child in one direction.
    pub fn transfer(
        &self,
        direction: Direction,
        index: usize,
        inputs: &mut [Real],
        outputs: &mut [Real],
    ) -> SystemResult<()> {
        let transfer = self
            .transfers
            .get(direction, index)
            .ok_or(SystemError::MissingTransfer { direction, index })?;
        transfer.transfer(inputs, outputs, direction)
    }

    /// Children in order, each paired with its forward transfer.
    pub fn steps_mut(&mut self) -> impl Iterator<Item = (usize, &mut Child, &dyn Transfer)> + '_ {
        self.children
            .iter_mut()
            .zip(self.transfers.forward().iter())
            .enumerate()
            .map(|(index, (child, transfer))| {
                let transfer: &dyn Transfer = transfer.as_ref();
                (index, child, transfer)
            })
    }
}
