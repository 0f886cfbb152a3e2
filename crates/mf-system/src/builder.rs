//! Incremental system builder.

use mf_core::MfError;
use tracing::warn;

use crate::error::SystemResult;
use crate::ownership::Ownership;
use crate::subsystem::{Subsystem, join_path};
use crate::system::{Child, System};
use crate::transfer::{Direction, SlotTransfer, Transfer, TransferTable};
use crate::validate;
use crate::vector::{VarDecl, VarVector};

/// Builder for constructing a system incrementally.
///
/// Add children in execution order with `add_subsystem`, wire them with
/// `connect`, then call `build()` to validate and freeze the layout and the
/// transfer table.
#[derive(Default)]
pub struct SystemBuilder {
    children: Vec<(String, Box<dyn Subsystem>)>,
    connections: Vec<(String, String)>,
    overrides: Vec<((Direction, usize), Box<dyn Transfer>)>,
    ownership: Ownership,
}

impl SystemBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child and return its index.
    pub fn add_subsystem(
        &mut self,
        name: impl Into<String>,
        subsystem: impl Subsystem + 'static,
    ) -> usize {
        self.add_boxed_subsystem(name, Box::new(subsystem))
    }

    pub fn add_boxed_subsystem(
        &mut self,
        name: impl Into<String>,
        subsystem: Box<dyn Subsystem>,
    ) -> usize {
        self.children.push((name.into(), subsystem));
        self.children.len() - 1
    }

    /// Connect an output (`child.var`) to an input (`child.var`).
    pub fn connect(&mut self, src: impl Into<String>, tgt: impl Into<String>) -> &mut Self {
        self.connections.push((src.into(), tgt.into()));
        self
    }

    /// Replace the transfer generated for one child and direction.
    pub fn set_transfer(
        &mut self,
        direction: Direction,
        index: usize,
        transfer: impl Transfer + 'static,
    ) -> &mut Self {
        self.overrides.push(((direction, index), Box::new(transfer)));
        self
    }

    pub fn set_ownership(&mut self, ownership: Ownership) -> &mut Self {
        self.ownership = ownership;
        self
    }

    /// Validate and build the system.
    pub fn build(self) -> SystemResult<System> {
        let names: Vec<&str> = self.children.iter().map(|(n, _)| n.as_str()).collect();
        validate::validate_names(&names)?;

        let child_count = self.children.len();
        let local = self.ownership.local_flags(child_count)?;

        let mut input_decls: Vec<VarDecl> = Vec::new();
        let mut output_decls: Vec<VarDecl> = Vec::new();
        let mut children = Vec::with_capacity(child_count);

        for ((name, subsystem), local) in self.children.into_iter().zip(local) {
            let inputs = subsystem.inputs();
            let outputs = subsystem.outputs();
            validate::validate_child_vars(&name, &inputs, &outputs)?;

            let input_range = input_decls.len()..input_decls.len() + inputs.len();
            let output_range = output_decls.len()..output_decls.len() + outputs.len();
            input_decls.extend(
                inputs
                    .into_iter()
                    .map(|d| VarDecl::new(join_path(&name, &d.name), d.default)),
            );
            output_decls.extend(
                outputs
                    .into_iter()
                    .map(|d| VarDecl::new(join_path(&name, &d.name), d.default)),
            );

            children.push(Child {
                pathname: name.clone(),
                name,
                subsystem,
                local,
                input_range,
                output_range,
            });
        }

        let input_index = VarVector::from_decls(&input_decls)?;
        let output_index = VarVector::from_decls(&output_decls)?;
        let pairs = validate::resolve_connections(&self.connections, &input_index, &output_index)?;

        let mut per_child: Vec<Vec<(usize, usize)>> = vec![Vec::new(); child_count];
        for (src, tgt) in pairs {
            let tgt_child = owner_of(&children, tgt, Child::input_range)?;
            let src_child = owner_of(&children, src, Child::output_range)?;
            if src_child >= tgt_child {
                warn!(
                    source = %output_index.names()[src],
                    target = %input_index.names()[tgt],
                    "feedback connection: source runs after target, a single pass reads its previous value"
                );
            }
            per_child[tgt_child].push((src, tgt));
        }

        let mut entries: Vec<((Direction, usize), Box<dyn Transfer>)> =
            Vec::with_capacity(2 * child_count + self.overrides.len());
        for (index, pairs) in per_child.into_iter().enumerate() {
            entries.push((
                (Direction::Fwd, index),
                Box::new(SlotTransfer::new(pairs.clone())),
            ));
            entries.push(((Direction::Rev, index), Box::new(SlotTransfer::new(pairs))));
        }
        // Later entries win, so overrides replace the generated transfers.
        entries.extend(self.overrides);
        let transfers = TransferTable::from_entries(child_count, entries)?;

        Ok(System {
            pathname: String::new(),
            children,
            transfers,
            input_decls,
            output_decls,
        })
    }
}

impl std::fmt::Debug for SystemBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.children.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("SystemBuilder")
            .field("children", &names)
            .field("connections", &self.connections)
            .field("ownership", &self.ownership)
            .finish_non_exhaustive()
    }
}

fn owner_of(
    children: &[Child],
    slot: usize,
    range: fn(&Child) -> std::ops::Range<usize>,
) -> SystemResult<usize> {
    children
        .iter()
        .position(|c| range(c).contains(&slot))
        .ok_or_else(|| {
            MfError::Invariant {
                what: "connected slot has no owning child",
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::LinearComponent;
    use crate::error::SystemError;

    fn lin(inputs: &[&str], output: &str) -> LinearComponent {
        let coefficients = vec![1.0; inputs.len()];
        LinearComponent::new(
            inputs.iter().map(|s| s.to_string()).collect(),
            output,
            coefficients,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn builder_lays_out_children_in_order() {
        let mut builder = SystemBuilder::new();
        let a = builder.add_subsystem("a", lin(&["x"], "y"));
        let b = builder.add_subsystem("b", lin(&["x1", "x2"], "y"));
        assert_eq!((a, b), (0, 1));

        let system = builder.build().unwrap();
        assert_eq!(system.len(), 2);
        assert_eq!(system.input_len(), 3);
        assert_eq!(system.output_len(), 2);
        assert_eq!(system.children()[1].input_range(), 1..3);
        assert_eq!(system.children()[1].output_range(), 1..2);
        let names: Vec<&str> = system.input_decls().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.x", "b.x1", "b.x2"]);
    }

    #[test]
    fn connections_become_per_child_transfers() {
        let mut builder = SystemBuilder::new();
        builder.add_subsystem("a", lin(&["x"], "y"));
        builder.add_subsystem("b", lin(&["x"], "y"));
        builder.connect("a.y", "b.x");
        let system = builder.build().unwrap();

        let mut inputs = vec![0.0, 0.0];
        let mut outputs = vec![4.0, 0.0];
        system
            .transfer(Direction::Fwd, 0, &mut inputs, &mut outputs)
            .unwrap();
        assert_eq!(inputs, vec![0.0, 0.0]);
        system
            .transfer(Direction::Fwd, 1, &mut inputs, &mut outputs)
            .unwrap();
        assert_eq!(inputs, vec![0.0, 4.0]);
    }

    #[test]
    fn every_child_has_both_transfers() {
        let mut builder = SystemBuilder::new();
        for name in ["a", "b", "c"] {
            builder.add_subsystem(name, lin(&["x"], "y"));
        }
        let system = builder.build().unwrap();
        assert_eq!(system.transfers().len(), 3);
        for i in 0..3 {
            assert!(system.transfers().get(Direction::Fwd, i).is_some());
            assert!(system.transfers().get(Direction::Rev, i).is_some());
        }
    }

    #[test]
    fn transfer_override_out_of_range_rejected() {
        let mut builder = SystemBuilder::new();
        builder.add_subsystem("a", lin(&["x"], "y"));
        builder.set_transfer(Direction::Fwd, 5, SlotTransfer::default());
        assert!(matches!(
            builder.build(),
            Err(SystemError::Core(MfError::IndexOob { index: 5, .. }))
        ));
    }

    #[test]
    fn ownership_applied_per_child() {
        let mut builder = SystemBuilder::new();
        for name in ["a", "b", "c"] {
            builder.add_subsystem(name, lin(&["x"], "y"));
        }
        builder.set_ownership(Ownership::RoundRobin { rank: 0, size: 2 });
        let system = builder.build().unwrap();
        let local: Vec<&str> = system.local_children().map(|c| c.name()).collect();
        assert_eq!(local, vec!["a", "c"]);
    }

    #[test]
    fn feedback_connection_is_allowed() {
        let mut builder = SystemBuilder::new();
        builder.add_subsystem("a", lin(&["x"], "y"));
        builder.add_subsystem("b", lin(&["x"], "y"));
        builder.connect("b.y", "a.x");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn set_pathname_propagates_to_children() {
        let mut builder = SystemBuilder::new();
        builder.add_subsystem("a", lin(&["x"], "y"));
        let mut system = builder.build().unwrap();
        assert_eq!(system.children()[0].pathname(), "a");
        system.set_pathname("outer");
        assert_eq!(system.pathname(), "outer");
        assert_eq!(system.children()[0].pathname(), "outer.a");
    }
}
