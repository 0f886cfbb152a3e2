//! Project validation logic.

use crate::schema::{
    ConnectionDef, GroupDef, IoSpecDef, OwnershipDef, Project, SubsystemDef, SubsystemKindDef,
    ValueDef,
};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_group(&project.model, "model")?;
    validate_values(&project.values, "values")
}

fn validate_group(group: &GroupDef, context: &str) -> Result<(), ValidationError> {
    let mut by_name: HashMap<&str, &SubsystemDef> = HashMap::new();
    for subsystem in &group.subsystems {
        validate_name(&subsystem.name, &format!("{context} subsystem name"))?;
        if by_name.insert(&subsystem.name, subsystem).is_some() {
            return Err(ValidationError::DuplicateName {
                name: subsystem.name.clone(),
                context: format!("{context} subsystems"),
            });
        }
        validate_subsystem(subsystem, &format!("{context}.{}", subsystem.name))?;
    }

    let mut targets = HashSet::new();
    for connection in &group.connections {
        validate_connection(connection, &by_name, context)?;
        if !targets.insert(&connection.tgt) {
            return Err(ValidationError::DuplicateName {
                name: connection.tgt.clone(),
                context: format!("{context} connection targets"),
            });
        }
    }

    validate_ownership(&group.ownership, group.subsystems.len(), context)
}

fn validate_name(name: &str, field: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.contains('.') {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            reason: "must be non-empty and must not contain '.'".to_string(),
        });
    }
    Ok(())
}

fn validate_subsystem(subsystem: &SubsystemDef, context: &str) -> Result<(), ValidationError> {
    match &subsystem.kind {
        SubsystemKindDef::Linear {
            inputs,
            output,
            coefficients,
            offset,
        } => {
            if inputs.len() != coefficients.len() {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} coefficients"),
                    value: coefficients.len().to_string(),
                    reason: format!("expected one coefficient per input ({})", inputs.len()),
                });
            }
            for (i, c) in coefficients.iter().chain(std::iter::once(offset)).enumerate() {
                if !c.is_finite() {
                    let field = if i < coefficients.len() {
                        format!("{context} coefficients[{i}]")
                    } else {
                        format!("{context} offset")
                    };
                    return Err(ValidationError::InvalidValue {
                        field,
                        value: c.to_string(),
                        reason: "must be finite".to_string(),
                    });
                }
            }

            let mut names = HashSet::new();
            for name in inputs.iter().chain(std::iter::once(output)) {
                validate_name(name, &format!("{context} variable name"))?;
                if !names.insert(name) {
                    return Err(ValidationError::DuplicateName {
                        name: name.clone(),
                        context: format!("{context} variables"),
                    });
                }
            }
            Ok(())
        }
        SubsystemKindDef::Group(group) => validate_group(group, context),
        SubsystemKindDef::Subproblem {
            model,
            values,
            inputs,
            outputs,
        } => {
            validate_group(model, context)?;
            validate_values(values, &format!("{context} values"))?;
            for spec in inputs.iter().chain(outputs) {
                let (name, alias) = match spec {
                    IoSpecDef::Name(name) => (name, name),
                    IoSpecDef::Aliased { name, alias } => (name, alias),
                };
                if name.is_empty() || alias.is_empty() {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{context} exposed variable"),
                        value: format!("{name} as {alias}"),
                        reason: "name and alias must be non-empty".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn validate_connection(
    connection: &ConnectionDef,
    by_name: &HashMap<&str, &SubsystemDef>,
    context: &str,
) -> Result<(), ValidationError> {
    for (end, is_source) in [(&connection.src, true), (&connection.tgt, false)] {
        let Some((child, var)) = end.split_once('.') else {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} connection"),
                value: end.clone(),
                reason: "expected 'subsystem.variable'".to_string(),
            });
        };
        let Some(subsystem) = by_name.get(child) else {
            return Err(ValidationError::MissingReference {
                name: child.to_string(),
                context: format!("{context} connection '{}' -> '{}'", connection.src, connection.tgt),
            });
        };
        if let SubsystemKindDef::Linear { inputs, output, .. } = &subsystem.kind {
            let known = if is_source {
                output == var
            } else {
                inputs.iter().any(|i| i == var)
            };
            if !known {
                return Err(ValidationError::MissingReference {
                    name: end.clone(),
                    context: format!(
                        "{context} connection {}",
                        if is_source { "source" } else { "target" }
                    ),
                });
            }
        }
    }
    Ok(())
}

fn validate_ownership(
    ownership: &OwnershipDef,
    child_count: usize,
    context: &str,
) -> Result<(), ValidationError> {
    match ownership {
        OwnershipDef::All => Ok(()),
        OwnershipDef::RoundRobin { rank, size } => {
            if *size == 0 || rank >= size {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} ownership"),
                    value: format!("rank {rank} of {size}"),
                    reason: "rank must be less than a non-zero size".to_string(),
                });
            }
            Ok(())
        }
        OwnershipDef::Explicit { local } => {
            if let Some(bad) = local.iter().find(|&&i| i >= child_count) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} ownership"),
                    value: bad.to_string(),
                    reason: format!("only {child_count} subsystems"),
                });
            }
            Ok(())
        }
    }
}

fn validate_values(values: &[ValueDef], context: &str) -> Result<(), ValidationError> {
    for value in values {
        if value.name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: context.to_string(),
                value: String::new(),
                reason: "name must be non-empty".to_string(),
            });
        }
        if !value.value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} '{}'", value.name),
                value: value.value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(name: &str, inputs: &[&str], output: &str) -> SubsystemDef {
        SubsystemDef {
            name: name.to_string(),
            kind: SubsystemKindDef::Linear {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                output: output.to_string(),
                coefficients: vec![1.0; inputs.len()],
                offset: 0.0,
            },
        }
    }

    fn project(model: GroupDef) -> Project {
        Project {
            version: 1,
            name: "test".to_string(),
            model,
            values: vec![],
        }
    }

    fn connect(src: &str, tgt: &str) -> ConnectionDef {
        ConnectionDef {
            src: src.to_string(),
            tgt: tgt.to_string(),
        }
    }

    #[test]
    fn valid_chain_passes() {
        let model = GroupDef {
            subsystems: vec![linear("a", &["x"], "y"), linear("b", &["x"], "y")],
            connections: vec![connect("a.y", "b.x")],
            ownership: OwnershipDef::All,
        };
        validate_project(&project(model)).unwrap();
    }

    #[test]
    fn future_version_rejected() {
        let mut p = project(GroupDef::default());
        p.version = 99;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn duplicate_subsystem_rejected() {
        let model = GroupDef {
            subsystems: vec![linear("a", &["x"], "y"), linear("a", &["x"], "y")],
            ..GroupDef::default()
        };
        assert!(matches!(
            validate_project(&project(model)),
            Err(ValidationError::DuplicateName { .. })
        ));
    }

    #[test]
    fn dotted_name_rejected() {
        let model = GroupDef {
            subsystems: vec![linear("a.b", &["x"], "y")],
            ..GroupDef::default()
        };
        assert!(matches!(
            validate_project(&project(model)),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn coefficient_count_checked() {
        let mut sub = linear("a", &["x", "z"], "y");
        if let SubsystemKindDef::Linear { coefficients, .. } = &mut sub.kind {
            coefficients.pop();
        }
        let model = GroupDef {
            subsystems: vec![sub],
            ..GroupDef::default()
        };
        assert!(matches!(
            validate_project(&project(model)),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn connection_to_missing_child_rejected() {
        let model = GroupDef {
            subsystems: vec![linear("a", &["x"], "y")],
            connections: vec![connect("a.y", "ghost.x")],
            ..GroupDef::default()
        };
        assert!(matches!(
            validate_project(&project(model)),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn connection_from_input_rejected() {
        let model = GroupDef {
            subsystems: vec![linear("a", &["x"], "y"), linear("b", &["x"], "y")],
            connections: vec![connect("a.x", "b.x")],
            ..GroupDef::default()
        };
        assert!(matches!(
            validate_project(&project(model)),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn bad_ownership_rejected() {
        let model = GroupDef {
            subsystems: vec![linear("a", &["x"], "y")],
            ownership: OwnershipDef::Explicit { local: vec![3] },
            ..GroupDef::default()
        };
        assert!(validate_project(&project(model)).is_err());
    }

    #[test]
    fn non_finite_value_rejected() {
        let mut p = project(GroupDef::default());
        p.values.push(ValueDef {
            name: "a.x".to_string(),
            value: f64::NAN,
        });
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
