//! Turn a project definition into a runnable problem.

use mf_solver::{Group, IoSpec, Problem, Subproblem};
use mf_system::{LinearComponent, Ownership, SystemBuilder};
use tracing::{debug, info};

use crate::ProjectResult;
use crate::schema::{GroupDef, IoSpecDef, OwnershipDef, Project, SubsystemKindDef, ValueDef};

/// Build the model tree of `project` and apply its initial values.
///
/// The project is expected to have passed [`crate::validate_project`];
/// anything it does not catch surfaces here as a system or solver error.
pub fn compile_project(project: &Project) -> ProjectResult<Problem> {
    let problem = compile_problem(&project.model, &project.values)?;
    info!(
        project = %project.name,
        inputs = problem.inputs().len(),
        outputs = problem.outputs().len(),
        "compiled project"
    );
    Ok(problem)
}

fn compile_problem(model: &GroupDef, values: &[ValueDef]) -> ProjectResult<Problem> {
    let mut problem = Problem::new(compile_group(model)?)?;
    for value in values {
        problem.set_val(&value.name, value.value)?;
    }
    Ok(problem)
}

/// Build one group, recursing into nested groups and subproblems.
pub fn compile_group(def: &GroupDef) -> ProjectResult<Group> {
    let mut builder = SystemBuilder::new();

    for subsystem in &def.subsystems {
        debug!(name = %subsystem.name, "adding subsystem");
        match &subsystem.kind {
            SubsystemKindDef::Linear {
                inputs,
                output,
                coefficients,
                offset,
            } => {
                let component =
                    LinearComponent::new(inputs.clone(), output, coefficients.clone(), *offset)?;
                builder.add_subsystem(&subsystem.name, component);
            }
            SubsystemKindDef::Group(group) => {
                builder.add_subsystem(&subsystem.name, compile_group(group)?);
            }
            SubsystemKindDef::Subproblem {
                model,
                values,
                inputs,
                outputs,
            } => {
                let problem = compile_problem(model, values)?;
                let inputs: Vec<IoSpec> = inputs.iter().map(io_spec).collect();
                let outputs: Vec<IoSpec> = outputs.iter().map(io_spec).collect();
                builder.add_subsystem(
                    &subsystem.name,
                    Subproblem::new(problem, &inputs, &outputs)?,
                );
            }
        }
    }

    for connection in &def.connections {
        builder.connect(&connection.src, &connection.tgt);
    }
    builder.set_ownership(ownership(&def.ownership));

    Ok(Group::new(builder.build()?))
}

pub fn ownership(def: &OwnershipDef) -> Ownership {
    match def {
        OwnershipDef::All => Ownership::All,
        OwnershipDef::RoundRobin { rank, size } => Ownership::RoundRobin {
            rank: *rank,
            size: *size,
        },
        OwnershipDef::Explicit { local } => Ownership::Explicit(local.iter().copied().collect()),
    }
}

fn io_spec(def: &IoSpecDef) -> IoSpec {
    match def {
        IoSpecDef::Name(name) => IoSpec::Name(name.clone()),
        IoSpecDef::Aliased { name, alias } => IoSpec::Aliased {
            name: name.clone(),
            alias: alias.clone(),
        },
    }
}
