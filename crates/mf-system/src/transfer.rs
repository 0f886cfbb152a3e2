//! Directional data transfers between the children of a system.

use std::collections::BTreeMap;
use std::fmt;

use mf_core::{MfError, Real};

use crate::error::{SystemError, SystemResult};

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Copy upstream outputs into a child's inputs.
    Fwd,
    /// Accumulate a child's inputs back into the upstream outputs.
    Rev,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Fwd => "fwd",
            Direction::Rev => "rev",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer operator bound to one child of a system.
///
/// `inputs` and `outputs` are the owning system's full vectors.
pub trait Transfer: Send {
    fn transfer(
        &self,
        inputs: &mut [Real],
        outputs: &mut [Real],
        direction: Direction,
    ) -> SystemResult<()>;
}

/// Slot-to-slot transfer: each pair is `(output slot, input slot)` in the
/// owning system's vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTransfer {
    pairs: Vec<(usize, usize)>,
}

impl SlotTransfer {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Transfer for SlotTransfer {
    fn transfer(
        &self,
        inputs: &mut [Real],
        outputs: &mut [Real],
        direction: Direction,
    ) -> SystemResult<()> {
        // Bounds are checked up front so a bad pair never leaves a partial copy.
        for &(src, tgt) in &self.pairs {
            if src >= outputs.len() {
                return Err(MfError::IndexOob {
                    what: "transfer source slot",
                    index: src,
                    len: outputs.len(),
                }
                .into());
            }
            if tgt >= inputs.len() {
                return Err(MfError::IndexOob {
                    what: "transfer target slot",
                    index: tgt,
                    len: inputs.len(),
                }
                .into());
            }
        }

        match direction {
            Direction::Fwd => {
                for &(src, tgt) in &self.pairs {
                    inputs[tgt] = outputs[src];
                }
            }
            Direction::Rev => {
                for &(src, tgt) in &self.pairs {
                    outputs[src] += inputs[tgt];
                }
            }
        }
        Ok(())
    }
}

/// Transfers of a system, one per child and direction, indexed by child
/// position.
///
/// Completeness is checked when the table is built, so looking up the
/// transfer of an existing child cannot fail later.
pub struct TransferTable {
    forward: Vec<Box<dyn Transfer>>,
    reverse: Vec<Box<dyn Transfer>>,
}

impl TransferTable {
    /// Build from per-direction lists; both must hold exactly one transfer
    /// per child.
    pub fn new(
        child_count: usize,
        forward: Vec<Box<dyn Transfer>>,
        reverse: Vec<Box<dyn Transfer>>,
    ) -> SystemResult<Self> {
        for (direction, list) in [(Direction::Fwd, &forward), (Direction::Rev, &reverse)] {
            if list.len() != child_count {
                return Err(SystemError::TransferCount {
                    direction,
                    expected: child_count,
                    actual: list.len(),
                });
            }
        }
        Ok(Self { forward, reverse })
    }

    /// Build from `(direction, child index)` keyed entries.
    ///
    /// Every key in `0..child_count` must be present for both directions.
    pub fn from_entries<I>(child_count: usize, entries: I) -> SystemResult<Self>
    where
        I: IntoIterator<Item = ((Direction, usize), Box<dyn Transfer>)>,
    {
        let mut keyed: BTreeMap<(Direction, usize), Box<dyn Transfer>> = BTreeMap::new();
        for ((direction, index), transfer) in entries {
            if index >= child_count {
                return Err(MfError::IndexOob {
                    what: "transfer child index",
                    index,
                    len: child_count,
                }
                .into());
            }
            keyed.insert((direction, index), transfer);
        }

        let mut take = |direction: Direction| -> SystemResult<Vec<Box<dyn Transfer>>> {
            (0..child_count)
                .map(|index| {
                    keyed
                        .remove(&(direction, index))
                        .ok_or(SystemError::MissingTransfer { direction, index })
                })
                .collect()
        };
        let forward = take(Direction::Fwd)?;
        let reverse = take(Direction::Rev)?;
        Self::new(child_count, forward, reverse)
    }

    /// Number of children covered.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn get(&self, direction: Direction, index: usize) -> Option<&dyn Transfer> {
        let list = match direction {
            Direction::Fwd => &self.forward,
            Direction::Rev => &self.reverse,
        };
        list.get(index).map(|t| t.as_ref())
    }

    pub fn forward(&self) -> &[Box<dyn Transfer>] {
        &self.forward
    }

    pub fn reverse(&self) -> &[Box<dyn Transfer>] {
        &self.reverse
    }
}

impl fmt::Debug for TransferTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferTable")
            .field("children", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(pairs: Vec<(usize, usize)>) -> Box<dyn Transfer> {
        Box::new(SlotTransfer::new(pairs))
    }

    #[test]
    fn forward_copies_outputs_into_inputs() {
        let t = SlotTransfer::new(vec![(0, 1), (1, 0)]);
        let mut inputs = [0.0, 0.0];
        let mut outputs = [3.0, 5.0];
        t.transfer(&mut inputs, &mut outputs, Direction::Fwd).unwrap();
        assert_eq!(inputs, [5.0, 3.0]);
        assert_eq!(outputs, [3.0, 5.0]);
    }

    #[test]
    fn reverse_accumulates_into_outputs() {
        let t = SlotTransfer::new(vec![(0, 0), (0, 1)]);
        let mut inputs = [1.0, 2.0];
        let mut outputs = [10.0];
        t.transfer(&mut inputs, &mut outputs, Direction::Rev).unwrap();
        assert_eq!(outputs, [13.0]);
    }

    #[test]
    fn out_of_range_slot_leaves_vectors_untouched() {
        let t = SlotTransfer::new(vec![(0, 0), (4, 1)]);
        let mut inputs = [0.0, 0.0];
        let mut outputs = [7.0];
        let err = t
            .transfer(&mut inputs, &mut outputs, Direction::Fwd)
            .unwrap_err();
        assert!(matches!(
            err,
            SystemError::Core(MfError::IndexOob { index: 4, .. })
        ));
        assert_eq!(inputs, [0.0, 0.0]);
    }

    #[test]
    fn table_rejects_wrong_count() {
        let err = TransferTable::new(2, vec![boxed(vec![])], vec![boxed(vec![]), boxed(vec![])])
            .unwrap_err();
        assert_eq!(
            err,
            SystemError::TransferCount {
                direction: Direction::Fwd,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn from_entries_reports_missing_child() {
        let entries = vec![
            ((Direction::Fwd, 0), boxed(vec![])),
            ((Direction::Rev, 0), boxed(vec![])),
            ((Direction::Rev, 1), boxed(vec![])),
        ];
        let err = TransferTable::from_entries(2, entries).unwrap_err();
        assert_eq!(
            err,
            SystemError::MissingTransfer {
                direction: Direction::Fwd,
                index: 1
            }
        );
    }

    #[test]
    fn from_entries_rejects_unknown_child() {
        let entries = vec![((Direction::Fwd, 3), boxed(vec![]))];
        assert!(TransferTable::from_entries(1, entries).is_err());
    }

    #[test]
    fn from_entries_complete_table() {
        let entries = (0..3).flat_map(|i| {
            [
                ((Direction::Fwd, i), boxed(vec![])),
                ((Direction::Rev, i), boxed(vec![])),
            ]
        });
        let table = TransferTable::from_entries(3, entries).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.get(Direction::Rev, 2).is_some());
        assert!(table.get(Direction::Fwd, 3).is_none());
    }
}
