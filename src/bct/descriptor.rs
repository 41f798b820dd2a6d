//! Static description of one analysis variant: what it needs, what it runs,
//! and how its results become outputs.

use serde::Serialize;

use super::{
    connectivity::Connectivity,
    outputs::{OutputKind, ScalarKind},
};
use crate::{
    error::{BctError, Result},
    execution::{ExecutionRequest, Parameters},
};

/// Menu group an algorithm is listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmGroup {
    pub name: String,
    pub subsection: String,
    pub key: String,
}

impl AlgorithmGroup {
    pub fn new(name: &str, subsection: &str, key: &str) -> Self {
        Self {
            name: name.into(),
            subsection: subsection.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputConstraint {
    Any,
    Undirected,
}

impl InputConstraint {
    pub fn accepts(self, connectivity: &Connectivity) -> bool {
        match self {
            Self::Any => true,
            Self::Undirected => connectivity.is_undirected(),
        }
    }
}

/// The single declared input of every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSchema {
    pub name: &'static str,
    pub label: String,
    #[serde(rename = "type")]
    pub datatype: &'static str,
    pub required: bool,
    pub constraint: InputConstraint,
}

impl InputSchema {
    pub fn accepts(&self, connectivity: &Connectivity) -> bool {
        self.constraint.accepts(connectivity)
    }
}

/// How one named engine result becomes an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSpec {
    Measure {
        key: String,
        title: String,
        label_x: String,
        label_y: String,
    },
    Scalar {
        key: String,
        title: String,
        #[serde(rename = "data_type")]
        kind: ScalarKind,
    },
}

impl OutputSpec {
    pub fn measure(key: &str, title: &str) -> Self {
        Self::Measure {
            key: key.into(),
            title: title.into(),
            label_x: String::new(),
            label_y: String::new(),
        }
    }

    pub fn float(key: &str, title: &str) -> Self {
        Self::Scalar {
            key: key.into(),
            title: title.into(),
            kind: ScalarKind::Float,
        }
    }

    pub fn int(key: &str, title: &str) -> Self {
        Self::Scalar {
            key: key.into(),
            title: title.into(),
            kind: ScalarKind::Int,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Measure { key, .. } | Self::Scalar { key, .. } => key,
        }
    }

    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Measure { .. } => OutputKind::Measure,
            Self::Scalar { .. } => OutputKind::Scalar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmDescriptor {
    pub id: String,
    pub group: AlgorithmGroup,
    pub name: String,
    pub description: String,
    /// BCT source file whose header documents the function.
    pub doc_file: String,
    pub connectivity_label: String,
    pub constraint: InputConstraint,
    pub snippet: String,
    /// Snippet variable the connectivity weights are bound to.
    pub binding: String,
    pub outputs: Vec<OutputSpec>,
}

impl AlgorithmDescriptor {
    pub fn input_schema(&self) -> InputSchema {
        InputSchema {
            name: "connectivity",
            label: self.connectivity_label.clone(),
            datatype: "Connectivity",
            required: true,
            constraint: self.constraint,
        }
    }

    pub fn output_kinds(&self) -> Vec<OutputKind> {
        self.outputs.iter().map(OutputSpec::kind).collect()
    }

    /// Refuses caller parameters named like a declared result, since the
    /// snippet might not reassign them.
    pub fn check_parameters(&self, extra: &Parameters) -> Result<()> {
        match self.outputs.iter().find(|o| extra.contains_key(o.key())) {
            Some(o) => Err(BctError::ParameterClash {
                variant: self.id.clone(),
                name: o.key().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Binds the weights over any caller-supplied parameter of the same name.
    pub fn request(&self, connectivity: &Connectivity, extra: Parameters) -> ExecutionRequest {
        let mut parameters = extra;
        parameters.insert(self.binding.clone(), connectivity.weights.clone().into());
        ExecutionRequest {
            code: self.snippet.clone(),
            parameters,
        }
    }
}
