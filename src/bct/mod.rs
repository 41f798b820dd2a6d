//! Brain Connectivity Toolbox analyses exposed as data-driven variants.

pub mod adapter;
pub mod connectivity;
pub mod descriptor;
pub mod outputs;
pub mod registry;

pub use adapter::{BctAdapter, Results};
pub use connectivity::Connectivity;
pub use descriptor::{AlgorithmDescriptor, AlgorithmGroup, InputConstraint, InputSchema, OutputSpec};
pub use outputs::{ConnectivityMeasure, Output, OutputKind, ScalarData, ScalarKind, ScalarValue};
pub use registry::Registry;
