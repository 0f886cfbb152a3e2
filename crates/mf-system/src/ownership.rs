//! Which children are evaluated by the local execution context.

use std::collections::BTreeSet;

use crate::error::{SystemError, SystemResult};

/// Local ownership policy for the children of a system.
///
/// Resolved once, at build time, into one flag per child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Every child is local.
    #[default]
    All,
    /// Child `i` is local when `i % size == rank`.
    RoundRobin { rank: usize, size: usize },
    /// Exactly the listed child indices are local.
    Explicit(BTreeSet<usize>),
}

impl Ownership {
    pub fn local_flags(&self, child_count: usize) -> SystemResult<Vec<bool>> {
        match self {
            Ownership::All => Ok(vec![true; child_count]),
            Ownership::RoundRobin { rank, size } => {
                if *size == 0 || rank >= size {
                    return Err(SystemError::Ownership {
                        what: format!("rank {rank} is not within a context of size {size}"),
                    });
                }
                Ok((0..child_count).map(|i| i % size == *rank).collect())
            }
            Ownership::Explicit(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i >= child_count) {
                    return Err(SystemError::Ownership {
                        what: format!("child index {bad} out of range for {child_count} children"),
                    });
                }
                Ok((0..child_count).map(|i| indices.contains(&i)).collect())
            }
        }
    }
}
