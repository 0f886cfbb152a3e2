//! Named variable storage.

use std::collections::HashMap;

use mf_core::Real;

use crate::error::{SystemError, SystemResult};

/// A declared variable: its name (relative to the declaring subsystem) and
/// the value it starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub default: Real,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, default: Real) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// Contiguous `f64` storage with name -> slot lookup.
///
/// Slots follow declaration order, so a system's vector is laid out child by
/// child and each child sees a contiguous range of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarVector {
    names: Vec<String>,
    values: Vec<Real>,
    index: HashMap<String, usize>,
}

impl VarVector {
    /// Allocate a vector from declarations, initialised to their defaults.
    pub fn from_decls(decls: &[VarDecl]) -> SystemResult<Self> {
        let mut vector = Self {
            names: Vec::with_capacity(decls.len()),
            values: Vec::with_capacity(decls.len()),
            index: HashMap::with_capacity(decls.len()),
        };
        for decl in decls {
            if vector.index.contains_key(&decl.name) {
                return Err(SystemError::DuplicateVariable {
                    name: decl.name.clone(),
                });
            }
            vector.index.insert(decl.name.clone(), vector.names.len());
            vector.names.push(decl.name.clone());
            vector.values.push(decl.default);
        }
        Ok(vector)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Real] {
        &mut self.values
    }

    /// Slot of a variable, if it exists.
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Real> {
        self.slot(name).map(|slot| self.values[slot])
    }

    pub fn set(&mut self, name: &str, value: Real) -> SystemResult<()> {
        let slot = self
            .slot(name)
            .ok_or_else(|| SystemError::UnknownVariable {
                name: name.to_string(),
            })?;
        self.values[slot] = value;
        Ok(())
    }

    /// Iterate `(name, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Real)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
