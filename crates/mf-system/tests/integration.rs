//! Integration tests for mf-system.

use mf_system::{
    Direction, LinearComponent, Ownership, SystemBuilder, SystemError, VarVector,
};

fn lin(inputs: &[&str], output: &str, offset: f64) -> LinearComponent {
    LinearComponent::new(
        inputs.iter().map(|s| s.to_string()).collect(),
        output,
        vec![1.0; inputs.len()],
        offset,
    )
    .unwrap()
}

#[test]
fn build_chain_and_walk_it_by_hand() {
    // a.y -> b.x -> b.y -> c.x
    let mut builder = SystemBuilder::new();
    builder.add_subsystem("a", lin(&["x"], "y", 1.0));
    builder.add_subsystem("b", lin(&["x"], "y", 1.0));
    builder.add_subsystem("c", lin(&["x"], "y", 1.0));
    builder.connect("a.y", "b.x").connect("b.y", "c.x");
    let mut system = builder.build().unwrap();
    system.set_pathname("chain");

    assert_eq!(system.len(), 3);
    assert_eq!(system.transfers().len(), 3);
    assert_eq!(system.child(2).unwrap().pathname(), "chain.c");
    assert_eq!(system.child_index("b"), Some(1));

    let mut inputs = VarVector::from_decls(system.input_decls()).unwrap();
    let mut outputs = VarVector::from_decls(system.output_decls()).unwrap();
    inputs.set("a.x", 0.0).unwrap();

    for (_, child, transfer) in system.steps_mut() {
        transfer
            .transfer(inputs.values_mut(), outputs.values_mut(), Direction::Fwd)
            .unwrap();
        child
            .solve_nonlinear(inputs.values_mut(), outputs.values_mut())
            .unwrap();
    }

    assert_eq!(outputs.get("a.y"), Some(1.0));
    assert_eq!(outputs.get("b.y"), Some(2.0));
    assert_eq!(outputs.get("c.y"), Some(3.0));
}

#[test]
fn reverse_transfer_is_available_for_every_child() {
    let mut builder = SystemBuilder::new();
    builder.add_subsystem("a", lin(&["x"], "y", 0.0));
    builder.add_subsystem("b", lin(&["x"], "y", 0.0));
    builder.connect("a.y", "b.x");
    let system = builder.build().unwrap();

    let mut inputs = vec![0.0, 2.5];
    let mut outputs = vec![1.0, 0.0];
    system
        .transfer(Direction::Rev, 1, &mut inputs, &mut outputs)
        .unwrap();
    assert_eq!(outputs, vec![3.5, 0.0]);
    assert!(system.transfers().get(Direction::Rev, 0).is_some());
    assert!(system.transfers().get(Direction::Rev, 2).is_none());
}

#[test]
fn ownership_marks_local_children() {
    let mut builder = SystemBuilder::new();
    for name in ["a", "b", "c", "d"] {
        builder.add_subsystem(name, lin(&["x"], "y", 0.0));
    }
    builder.set_ownership(Ownership::RoundRobin { rank: 0, size: 2 });
    let system = builder.build().unwrap();

    let local: Vec<&str> = system.local_children().map(|c| c.name()).collect();
    assert_eq!(local, vec!["a", "c"]);
}

#[test]
fn invalid_wiring_is_rejected_at_build() {
    let mut builder = SystemBuilder::new();
    builder.add_subsystem("a", lin(&["x"], "y", 0.0));
    builder.add_subsystem("b", lin(&["x"], "y", 0.0));
    builder.connect("a.x", "b.x");
    assert!(matches!(
        builder.build(),
        Err(SystemError::NotAnOutput { .. })
    ));

    let mut builder = SystemBuilder::new();
    builder.add_subsystem("a", lin(&["x"], "y", 0.0));
    builder.connect("a.y", "a.z");
    assert!(matches!(
        builder.build(),
        Err(SystemError::UnknownVariable { .. })
    ));
}
