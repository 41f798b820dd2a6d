#![cfg(unix)]

use std::{fs, os::unix::fs::PermissionsExt, path::Path};

use anyhow::Result;
use bctbridge::{
    bct::{BctAdapter, Connectivity, Output, Registry},
    execution::{Engine, EngineValue, NumericArray, Parameters},
    process::{octave::OctaveEngine, Interpreter, InterpreterType},
    BctError,
};

// Stands in for `octave --no-gui --quiet <script>`: checks the exchange files
// sit next to the script, then answers like the wrapper would.
const FAKE_OCTAVE: &str = r#"#!/bin/sh
for a in "$@"; do script="$a"; done
dir=$(dirname "$script")
grep -q "addpath('/opt/bct');" "$script" || { echo "search path missing" >&2; exit 3; }
grep -q '"CW"' "$dir/parameters.json" || { echo "CW missing" >&2; exit 4; }
echo "octave ran $script"
cat > "$dir/results.json" <<'JSON'
{"Ci": {"shape": [1, 3], "data": [1, 1, 2], "posinf": [], "neginf": [], "nan": []},
 "Q": {"shape": [1, 1], "data": 0.42, "posinf": [], "neginf": [], "nan": []}}
JSON
exit 0
"#;

const FAILING_OCTAVE: &str = r#"#!/bin/sh
echo "error: modularity_dir: undefined near line 1" >&2
exit 1
"#;

fn install(dir: &Path, name: &str, body: &str) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}

// Both fakes run from one test so no other test forks while a script is being written.
#[tokio::test]
async fn test_subprocess_engine_round_trip() -> Result<()> {
    let bin = tempfile::tempdir()?;
    let ok = install(bin.path(), "octave", FAKE_OCTAVE)?;
    let bad = install(bin.path(), "octave-broken", FAILING_OCTAVE)?;

    let interpreter = Interpreter::new(&ok);
    assert_eq!(interpreter.kind, InterpreterType::Octave);

    let registry = Registry::builtin();
    let conn = Connectivity::new(
        "conn-1",
        NumericArray::from_rows(vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]])?,
    )?;
    let mut adapter = BctAdapter::new(
        registry.lookup("modularity_dir")?,
        OctaveEngine::new(interpreter),
        "/opt/bct",
    );
    let outputs = adapter.launch(&conn, Parameters::new()).await?;
    assert_eq!(outputs.len(), 2);
    match &outputs[1] {
        Output::Scalar(v) => assert_eq!(v.data_name, "Maximized Modularity"),
        other => panic!("expected a scalar, got {other:?}"),
    }

    let mut raw = OctaveEngine::new(Interpreter::new(&ok));
    raw.add_search_path(Path::new("/opt/bct"));
    let mut params = Parameters::new();
    params.insert("CW".into(), EngineValue::Scalar(1.0));
    let run = raw.run("[Ci,Q] = modularity_dir(CW);", &params).await?;
    assert!(run.success());
    assert!(run.log.contains("octave ran"));
    assert_eq!(run.results["Q"], EngineValue::Scalar(0.42));

    let mut adapter = BctAdapter::new(
        registry.lookup("modularity_dir")?,
        OctaveEngine::new(Interpreter::new(&bad)),
        "/opt/bct",
    );
    match adapter.launch(&conn, Parameters::new()).await {
        Err(BctError::EngineFailure { status, log }) => {
            assert_eq!(status, 1);
            assert!(log.contains("undefined near line 1"));
        }
        other => panic!("expected an engine failure, got {other:?}"),
    }
    Ok(())
}
