//! Execution engine: protocol and result types.

use std::{collections::BTreeMap, path::Path};

use crate::error::Result;

pub mod value;

pub use value::{EngineValue, NumericArray};

pub type Parameters = BTreeMap<String, EngineValue>;

/// Snippet plus the named values it expects to find in its workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionRequest {
    pub code: String,
    pub parameters: Parameters,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<EngineValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// What the engine hands back for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub status: i32,
    pub log: String,
    pub results: BTreeMap<String, EngineValue>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A MATLAB-compatible computation engine.
///
/// Implementations own their transport; callers only see code in and named
/// values out. A non-zero `status` is reported through [`ExecutionResult`],
/// not as an `Err`; `Err` is reserved for failing to reach the engine at all.
#[allow(async_fn_in_trait)]
pub trait Engine {
    fn add_search_path(&mut self, path: &Path);

    async fn run(&self, code: &str, parameters: &Parameters) -> Result<ExecutionResult>;
}
