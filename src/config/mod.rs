use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        // Read .bctrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    if let Some((k, v)) = parse_line(&line) {
                        map.insert(k, v);
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        resolve_bct_path(&mut map);
        Self { inner: map, config_path }
    }

    /// Builds a config from explicit pairs only, ignoring files and the environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = default_map();
        for (k, v) in pairs {
            map.insert(k.into(), v.into());
        }
        resolve_bct_path(&mut map);
        Self { inner: map, config_path: PathBuf::new() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn matlab_executable(&self) -> Option<PathBuf> {
        self.get_path("MATLAB_EXECUTABLE")
    }

    pub fn bct_path(&self) -> PathBuf {
        self.get_path("BCT_PATH").unwrap_or_default()
    }

    pub fn log_filter(&self) -> String {
        self.get("BCT_LOG").unwrap_or_else(|| "warn".into())
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            executable: self.matlab_executable(),
            bct_path: self.bct_path(),
        }
    }
}

/// Engine location handed to the execution bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub executable: Option<PathBuf>,
    pub bct_path: PathBuf,
}

impl EngineConfig {
    pub fn new(executable: impl Into<PathBuf>, bct_path: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(executable.into()),
            bct_path: bct_path.into(),
        }
    }

    /// Only checks that an executable is configured; never starts it.
    pub fn is_available(&self) -> bool {
        self.executable
            .as_deref()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false)
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    Some((k.trim().to_string(), v.trim().to_string()))
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "MATLAB_EXECUTABLE",
        "BCT_PATH",
        "EXTERNALS_FOLDER_PARENT",
        "BCT_LOG",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("bctbridge").join(".bctrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let base = BaseDirs::new()
        .map(|b| b.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share"));

    m.insert(
        "EXTERNALS_FOLDER_PARENT".into(),
        base.join("bctbridge").to_string_lossy().into_owned(),
    );
    m.insert("MATLAB_EXECUTABLE".into(), String::new());
    m.insert("BCT_LOG".into(), "warn".into());
    m
}

// BCT lives under <EXTERNALS_FOLDER_PARENT>/externals/BCT unless set explicitly.
fn resolve_bct_path(map: &mut HashMap<String, String>) {
    let explicit = map.get("BCT_PATH").map(|v| !v.is_empty()).unwrap_or(false);
    if explicit {
        return;
    }
    let parent = map.get("EXTERNALS_FOLDER_PARENT").cloned().unwrap_or_default();
    let path = Path::new(&parent).join("externals").join("BCT");
    map.insert("BCT_PATH".into(), path.to_string_lossy().into_owned());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_skips_comments_and_blanks() {
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("novalue"), None);
        assert_eq!(
            parse_line(" MATLAB_EXECUTABLE = /usr/bin/octave "),
            Some(("MATLAB_EXECUTABLE".into(), "/usr/bin/octave".into()))
        );
    }

    #[test]
    fn test_bct_path_derived_from_externals_parent() {
        let cfg = Config::from_pairs([("EXTERNALS_FOLDER_PARENT", "/opt/tvb")]);
        assert_eq!(cfg.bct_path(), Path::new("/opt/tvb/externals/BCT"));
    }

    #[test]
    fn test_explicit_bct_path_wins() {
        let cfg = Config::from_pairs([
            ("EXTERNALS_FOLDER_PARENT", "/opt/tvb"),
            ("BCT_PATH", "/srv/bct"),
        ]);
        assert_eq!(cfg.bct_path(), Path::new("/srv/bct"));
    }

    #[test]
    fn test_engine_availability_follows_executable() {
        let unset = Config::from_pairs(Vec::<(String, String)>::new());
        assert!(!unset.engine().is_available());

        let empty = Config::from_pairs([("MATLAB_EXECUTABLE", "")]);
        assert!(!empty.engine().is_available());

        // Availability does not verify that the file exists.
        let set = Config::from_pairs([("MATLAB_EXECUTABLE", "/nonexistent/octave")]);
        assert!(set.engine().is_available());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".bctrc");
        fs::write(&path, "# engine\nBCT_PATH=/data/bct\nUNKNOWN_KEY=1\n").unwrap();
        let cfg = Config::load_from(path);
        if env::var("BCT_PATH").is_err() {
            assert_eq!(cfg.bct_path(), Path::new("/data/bct"));
        }
        assert_eq!(cfg.get("UNKNOWN_KEY").as_deref(), Some("1"));
    }
}
