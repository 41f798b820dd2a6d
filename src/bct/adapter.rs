//! Shared execution path for every analysis variant.

use std::{collections::BTreeMap, path::PathBuf};

use tracing::{debug, error, info};

use super::{
    connectivity::Connectivity,
    descriptor::{AlgorithmDescriptor, InputSchema, OutputSpec},
    outputs::{ConnectivityMeasure, Output, OutputKind, ScalarData, ScalarKind, ScalarValue},
};
use crate::{
    config::EngineConfig,
    error::{BctError, Result},
    execution::{Engine, EngineValue, ExecutionRequest, Parameters},
};

/// Results keyed by the variable names used in the snippet.
pub type Results = BTreeMap<String, EngineValue>;

const OUTPUT_KINDS: [OutputKind; 2] = [OutputKind::Measure, OutputKind::Scalar];

/// One analysis variant bound to an engine.
///
/// Requires BCT deployed locally and MATLAB or Octave installed separately.
pub struct BctAdapter<'a, E> {
    descriptor: &'a AlgorithmDescriptor,
    engine: E,
    bct_path: PathBuf,
}

impl<'a, E: Engine> BctAdapter<'a, E> {
    pub fn new(descriptor: &'a AlgorithmDescriptor, engine: E, bct_path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            engine,
            bct_path: bct_path.into(),
        }
    }

    pub fn descriptor(&self) -> &AlgorithmDescriptor {
        self.descriptor
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// True when an engine executable is configured. Nothing is started.
    pub fn is_available(cfg: &EngineConfig) -> bool {
        cfg.is_available()
    }

    pub fn describe_inputs(&self) -> Vec<InputSchema> {
        vec![self.descriptor.input_schema()]
    }

    pub fn describe_outputs(&self) -> &'static [OutputKind] {
        &OUTPUT_KINDS
    }

    /// Unknown: the work happens in the engine process.
    pub fn estimate_memory(&self) -> i64 {
        -1
    }

    pub fn estimate_disk(&self) -> u64 {
        0
    }

    pub async fn run_external(&mut self, request: &ExecutionRequest) -> Result<Results> {
        self.engine.add_search_path(&self.bct_path);
        info!(variant = %self.descriptor.id, code = %request.code, "starting engine execution");
        let run = self.engine.run(&request.code, &request.parameters).await?;
        debug!(variant = %self.descriptor.id, status = run.status, "code run in engine");
        debug!(variant = %self.descriptor.id, log = %run.log, "engine log");
        if !run.success() {
            error!(variant = %self.descriptor.id, status = run.status, "engine execution failed");
            return Err(BctError::EngineFailure {
                status: run.status,
                log: run.log,
            });
        }
        let keys: Vec<&String> = run.results.keys().collect();
        debug!(variant = %self.descriptor.id, results = ?keys, "finished engine execution");
        Ok(run.results)
    }

    /// Runs the variant once. The input constraint is assumed to have been
    /// checked by whoever picked this variant for `connectivity`.
    pub async fn launch(&mut self, connectivity: &Connectivity, extra: Parameters) -> Result<Vec<Output>> {
        let request = self.descriptor.request(connectivity, extra);
        let results = self.run_external(&request).await?;
        self.collect(&results, connectivity)
    }

    fn collect(&self, results: &Results, connectivity: &Connectivity) -> Result<Vec<Output>> {
        self.descriptor
            .outputs
            .iter()
            .map(|spec| match spec {
                OutputSpec::Measure {
                    key,
                    title,
                    label_x,
                    label_y,
                } => self
                    .build_measure(results, key, connectivity, title, label_x, label_y)
                    .map(Output::Measure),
                OutputSpec::Scalar { key, title, kind } => self
                    .build_scalar(results, key, title, *kind)
                    .map(Output::Scalar),
            })
            .collect()
    }

    fn result<'r>(&self, results: &'r Results, key: &str) -> Result<&'r EngineValue> {
        results.get(key).ok_or_else(|| {
            error!(variant = %self.descriptor.id, key, "declared result missing from engine response");
            BctError::ContractMismatch {
                variant: self.descriptor.id.clone(),
                key: key.to_string(),
            }
        })
    }

    pub fn build_measure(
        &self,
        results: &Results,
        key: &str,
        connectivity: &Connectivity,
        title: &str,
        label_x: &str,
        label_y: &str,
    ) -> Result<ConnectivityMeasure> {
        let raw = self.result(results, key)?;
        Ok(ConnectivityMeasure {
            array_data: raw.clone().into_array(),
            connectivity: connectivity.gid.clone(),
            title: title.to_string(),
            label_x: label_x.to_string(),
            label_y: label_y.to_string(),
        })
    }

    pub fn build_scalar(&self, results: &Results, key: &str, title: &str, kind: ScalarKind) -> Result<ScalarValue> {
        let raw = self.result(results, key)?;
        let value = raw.as_scalar().ok_or_else(|| BctError::NotScalar {
            variant: self.descriptor.id.clone(),
            key: key.to_string(),
            shape: raw.shape(),
        })?;
        let data_value = match kind {
            ScalarKind::Float => ScalarData::Float(value),
            ScalarKind::Int => ScalarData::Int(self.to_int(key, value)?),
        };
        Ok(ScalarValue {
            data_value,
            data_type: kind,
            data_name: title.to_string(),
        })
    }

    // Truncates toward zero; NaN, infinities and anything past i64 are refused.
    fn to_int(&self, key: &str, value: f64) -> Result<i64> {
        let t = value.trunc();
        if value.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
            Ok(t as i64)
        } else {
            error!(variant = %self.descriptor.id, key, value, "result has no integer value");
            Err(BctError::NotInteger {
                variant: self.descriptor.id.clone(),
                key: key.to_string(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bct::registry::Registry, execution::{ExecutionResult, NumericArray}};
    use std::path::Path;

    struct NullEngine;

    impl Engine for NullEngine {
        fn add_search_path(&mut self, _path: &Path) {}

        async fn run(&self, _code: &str, _parameters: &Parameters) -> Result<ExecutionResult> {
            Ok(ExecutionResult::default())
        }
    }

    fn conn() -> Connectivity {
        Connectivity::new(
            "conn-1",
            NumericArray::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_static_queries() {
        let reg = Registry::builtin();
        let adapter = BctAdapter::new(reg.lookup("distance_bin").unwrap(), NullEngine, "/opt/bct");
        assert_eq!(adapter.estimate_memory(), -1);
        assert_eq!(adapter.estimate_disk(), 0);
        assert_eq!(adapter.describe_outputs(), &[OutputKind::Measure, OutputKind::Scalar]);
        assert_eq!(adapter.describe_inputs().len(), 1);
        assert!(!BctAdapter::<NullEngine>::is_available(&EngineConfig::default()));
    }

    #[test]
    fn test_build_scalar_conversions() {
        let reg = Registry::builtin();
        let adapter = BctAdapter::new(reg.lookup("findwalks").unwrap(), NullEngine, "/opt/bct");
        let mut results = Results::new();
        results.insert("x".into(), EngineValue::Scalar(-2.7));
        results.insert("m".into(), NumericArray::scalar(5.0).into());
        results.insert("v".into(), NumericArray::vector(vec![1.0, 2.0]).into());

        let f = adapter.build_scalar(&results, "x", "f", ScalarKind::Float).unwrap();
        assert_eq!(f.data_value, ScalarData::Float(-2.7));
        assert_eq!(f.data_type, ScalarKind::Float);

        let i = adapter.build_scalar(&results, "x", "i", ScalarKind::Int).unwrap();
        assert_eq!(i.data_value, ScalarData::Int(-2));
        assert_eq!(i.data_value.kind(), ScalarKind::Int);

        let one = adapter.build_scalar(&results, "m", "one", ScalarKind::Int).unwrap();
        assert_eq!(one.data_value, ScalarData::Int(5));

        assert!(matches!(
            adapter.build_scalar(&results, "v", "vec", ScalarKind::Float),
            Err(BctError::NotScalar { .. })
        ));
        assert!(matches!(
            adapter.build_scalar(&results, "missing", "?", ScalarKind::Float),
            Err(BctError::ContractMismatch { .. })
        ));
    }

    #[test]
    fn test_build_scalar_int_refuses_non_finite_and_out_of_range() {
        let reg = Registry::builtin();
        let adapter = BctAdapter::new(reg.lookup("findwalks").unwrap(), NullEngine, "/opt/bct");
        let mut results = Results::new();
        results.insert("nan".into(), EngineValue::Scalar(f64::NAN));
        results.insert("inf".into(), EngineValue::Scalar(f64::INFINITY));
        results.insert("neg_inf".into(), NumericArray::scalar(f64::NEG_INFINITY).into());
        results.insert("huge".into(), EngineValue::Scalar(1e19));
        results.insert("edge".into(), EngineValue::Scalar(-9.223372036854775808e18));

        for key in ["nan", "inf", "neg_inf", "huge"] {
            assert!(
                matches!(
                    adapter.build_scalar(&results, key, key, ScalarKind::Int),
                    Err(BctError::NotInteger { .. })
                ),
                "{key} converted"
            );
        }
        let edge = adapter.build_scalar(&results, "edge", "edge", ScalarKind::Int).unwrap();
        assert_eq!(edge.data_value, ScalarData::Int(i64::MIN));

        // the float wrapper still passes non-finite values through
        let f = adapter.build_scalar(&results, "inf", "inf", ScalarKind::Float).unwrap();
        assert_eq!(f.data_value, ScalarData::Float(f64::INFINITY));
    }

    #[test]
    fn test_build_measure_keeps_payload() {
        let reg = Registry::builtin();
        let adapter = BctAdapter::new(reg.lookup("distance_bin").unwrap(), NullEngine, "/opt/bct");
        let payload = NumericArray::from_rows(vec![vec![0.0, f64::INFINITY], vec![1.0, 0.0]]).unwrap();
        let mut results = Results::new();
        results.insert("D".into(), payload.clone().into());

        let m = adapter
            .build_measure(&results, "D", &conn(), "Distance matrix", "x", "y")
            .unwrap();
        assert_eq!(m.array_data, payload);
        assert_eq!(m.connectivity, "conn-1");
        assert_eq!((m.label_x.as_str(), m.label_y.as_str()), ("x", "y"));
    }
}
