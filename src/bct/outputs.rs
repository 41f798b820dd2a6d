//! Result datatypes produced by a launch.

use serde::{Deserialize, Serialize};

use crate::execution::NumericArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Measure,
    Scalar,
}

/// Labeled array tied back to the connectivity it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityMeasure {
    pub array_data: NumericArray,
    pub connectivity: String,
    pub title: String,
    pub label_x: String,
    pub label_y: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Float,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarData {
    Int(i64),
    Float(f64),
}

impl ScalarData {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Float(_) => ScalarKind::Float,
            Self::Int(_) => ScalarKind::Int,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarValue {
    pub data_value: ScalarData,
    pub data_type: ScalarKind,
    pub data_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    Measure(ConnectivityMeasure),
    Scalar(ScalarValue),
}

impl Output {
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Measure(_) => OutputKind::Measure,
            Self::Scalar(_) => OutputKind::Scalar,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Measure(m) => &m.title,
            Self::Scalar(v) => &v.data_name,
        }
    }
}
