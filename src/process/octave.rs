//! Subprocess-backed engine: one interpreter process per run.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::{script, Interpreter};
use crate::{
    config::EngineConfig,
    error::{BctError, Result},
    execution::{Engine, ExecutionResult, Parameters},
};

#[derive(Debug, Clone)]
pub struct OctaveEngine {
    interpreter: Interpreter,
    search_paths: Vec<PathBuf>,
}

impl OctaveEngine {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            search_paths: Vec::new(),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        let executable = cfg
            .executable
            .clone()
            .filter(|_| cfg.is_available())
            .ok_or_else(|| BctError::EngineUnavailable {
                reason: "MATLAB_EXECUTABLE is not configured".into(),
            })?;
        Ok(Self::new(Interpreter::new(executable)))
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Engine for OctaveEngine {
    fn add_search_path(&mut self, path: &Path) {
        if !self.search_paths.iter().any(|p| p == path) {
            self.search_paths.push(path.to_path_buf());
        }
    }

    async fn run(&self, code: &str, parameters: &Parameters) -> Result<ExecutionResult> {
        let workdir = tempfile::Builder::new()
            .prefix("bctbridge-")
            .tempdir()
            .map_err(|e| BctError::io(std::env::temp_dir(), e))?;
        let parameters_file = workdir.path().join("parameters.json");
        let results_file = workdir.path().join("results.json");
        let script_file = workdir.path().join("bct_run.m");

        let payload = serde_json::to_string(&script::encode_parameters(parameters))?;
        fs::write(&parameters_file, payload)
            .await
            .map_err(|e| BctError::io(&parameters_file, e))?;

        let body = script::wrapper(&self.search_paths, &parameters_file, &results_file, code);
        fs::write(&script_file, body)
            .await
            .map_err(|e| BctError::io(&script_file, e))?;

        let mut cmd = self
            .interpreter
            .kind
            .command(&self.interpreter.executable, &script_file);
        cmd.current_dir(workdir.path());
        debug!(
            executable = %self.interpreter.executable.display(),
            kind = ?self.interpreter.kind,
            "spawning engine"
        );
        let child = cmd.spawn().map_err(|e| BctError::EngineUnavailable {
            reason: format!(
                "failed to start {}: {}",
                self.interpreter.executable.display(),
                e
            ),
        })?;
        let out = child
            .wait_with_output()
            .await
            .map_err(|e| BctError::io(&self.interpreter.executable, e))?;

        let mut status = out.status.code().unwrap_or(-1);
        let mut log = String::new();
        if !out.stdout.is_empty() {
            log.push_str(&String::from_utf8_lossy(&out.stdout));
        }
        if !out.stderr.is_empty() {
            if !log.is_empty() {
                log.push('\n');
            }
            log.push_str(&String::from_utf8_lossy(&out.stderr));
        }

        let results = if status == 0 {
            match fs::read_to_string(&results_file).await {
                Ok(text) => script::decode_results(&text)?,
                Err(e) => {
                    // exit(0) without a results file means the wrapper never finished
                    status = -1;
                    log.push_str(&format!("\nno results written: {e}"));
                    Default::default()
                }
            }
        } else {
            Default::default()
        };

        Ok(ExecutionResult { status, log, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_executable() {
        let err = OctaveEngine::from_config(&EngineConfig::default()).unwrap_err();
        assert!(matches!(err, BctError::EngineUnavailable { .. }));

        let engine = OctaveEngine::from_config(&EngineConfig::new("/usr/bin/octave", "/opt/bct")).unwrap();
        assert_eq!(engine.interpreter().executable, PathBuf::from("/usr/bin/octave"));
    }

    #[test]
    fn test_search_paths_are_deduplicated() {
        let mut engine = OctaveEngine::new(Interpreter::new("octave"));
        engine.add_search_path(Path::new("/opt/bct"));
        engine.add_search_path(Path::new("/opt/bct"));
        engine.add_search_path(Path::new("/opt/extra"));
        assert_eq!(engine.search_paths().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_executable_is_unavailable() {
        let engine = OctaveEngine::new(Interpreter::new("/nonexistent/bin/octave"));
        let err = engine.run("x = 1;", &Parameters::new()).await.unwrap_err();
        assert!(matches!(err, BctError::EngineUnavailable { .. }));
    }
}
