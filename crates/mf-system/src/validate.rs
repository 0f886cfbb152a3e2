//! Build-time validation of names and connections.

use std::collections::{HashMap, HashSet};

use crate::error::{SystemError, SystemResult};
use crate::subsystem::join_path;
use crate::vector::{VarDecl, VarVector};

/// Child names must be non-empty, dot-free and unique.
pub(crate) fn validate_names(names: &[&str]) -> SystemResult<()> {
    let mut seen = HashSet::new();
    for &name in names {
        if name.is_empty() {
            return Err(SystemError::InvalidName {
                name: name.to_string(),
                reason: "name is empty",
            });
        }
        if name.contains('.') {
            return Err(SystemError::InvalidName {
                name: name.to_string(),
                reason: "name contains '.'",
            });
        }
        if !seen.insert(name) {
            return Err(SystemError::DuplicateSubsystem {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A child's variable names must be non-empty and an input may not share a
/// name with an output.
pub(crate) fn validate_child_vars(
    child: &str,
    inputs: &[VarDecl],
    outputs: &[VarDecl],
) -> SystemResult<()> {
    let input_names: HashSet<&str> = inputs.iter().map(|d| d.name.as_str()).collect();
    for decl in inputs.iter().chain(outputs) {
        if decl.name.is_empty() {
            return Err(SystemError::InvalidName {
                name: child.to_string(),
                reason: "declares a variable with an empty name",
            });
        }
    }
    if let Some(clash) = outputs
        .iter()
        .find(|d| input_names.contains(d.name.as_str()))
    {
        return Err(SystemError::DuplicateVariable {
            name: join_path(child, &clash.name),
        });
    }
    Ok(())
}

/// Resolve `(source, target)` names into `(output slot, input slot)` pairs.
///
/// Sources must be outputs, targets must be inputs, and an input is fed by at
/// most one source.
pub(crate) fn resolve_connections(
    connections: &[(String, String)],
    inputs: &VarVector,
    outputs: &VarVector,
) -> SystemResult<Vec<(usize, usize)>> {
    let mut fed_by: HashMap<usize, &str> = HashMap::new();
    let mut pairs = Vec::with_capacity(connections.len());

    for (src, tgt) in connections {
        let src_slot = match outputs.slot(src) {
            Some(slot) => slot,
            None if inputs.contains(src) => {
                return Err(SystemError::NotAnOutput { name: src.clone() });
            }
            None => return Err(SystemError::UnknownVariable { name: src.clone() }),
        };
        let tgt_slot = match inputs.slot(tgt) {
            Some(slot) => slot,
            None if outputs.contains(tgt) => {
                return Err(SystemError::NotAnInput { name: tgt.clone() });
            }
            None => return Err(SystemError::UnknownVariable { name: tgt.clone() }),
        };

        if let Some(existing) = fed_by.insert(tgt_slot, src.as_str()) {
            return Err(SystemError::AlreadyConnected {
                name: tgt.clone(),
                existing: existing.to_string(),
            });
        }
        pairs.push((src_slot, tgt_slot));
    }

    Ok(pairs)
}
