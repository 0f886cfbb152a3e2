//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Missing in the earliest files, which read as version 0.
    #[serde(default)]
    pub version: u32,
    pub name: String,
    pub model: GroupDef,
    /// Initial values applied after the model is set up, by absolute name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupDef {
    #[serde(default)]
    pub subsystems: Vec<SubsystemDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub ownership: OwnershipDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubsystemDef {
    pub name: String,
    pub kind: SubsystemKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SubsystemKindDef {
    /// `output = Σ coefficients[i] * inputs[i] + offset`
    Linear {
        inputs: Vec<String>,
        output: String,
        coefficients: Vec<f64>,
        #[serde(default)]
        offset: f64,
    },
    /// Nested group run by its own single-pass solver.
    Group(GroupDef),
    /// A separate model run as one component.
    Subproblem {
        model: GroupDef,
        #[serde(default)]
        values: Vec<ValueDef>,
        #[serde(default)]
        inputs: Vec<IoSpecDef>,
        #[serde(default)]
        outputs: Vec<IoSpecDef>,
    },
}

/// Either a bare trailing name or an exact name with an alias.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IoSpecDef {
    Name(String),
    Aliased { name: String, alias: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    /// `child.output`
    pub src: String,
    /// `child.input`
    pub tgt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OwnershipDef {
    #[default]
    All,
    RoundRobin {
        rank: usize,
        size: usize,
    },
    Explicit {
        local: Vec<usize>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueDef {
    pub name: String,
    pub value: f64,
}
