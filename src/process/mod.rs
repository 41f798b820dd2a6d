//! Interpreter process management: picking the interpreter and its command line.

use std::path::{Path, PathBuf};

use tokio::process::Command;

pub mod octave;
mod script;

pub use octave::OctaveEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterType {
    Octave,
    Matlab,
}

impl InterpreterType {
    /// Guesses the interpreter from the executable name; anything not named
    /// like Octave is driven as MATLAB.
    pub fn detect(executable: &Path) -> Self {
        let name = executable
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name.contains("octave") {
            Self::Octave
        } else {
            Self::Matlab
        }
    }

    pub fn command(self, executable: &Path, script: &Path) -> Command {
        let mut cmd = Command::new(executable);
        match self {
            Self::Octave => {
                cmd.arg("--no-gui").arg("--quiet").arg(script);
            }
            Self::Matlab => {
                let call = format!("run('{}')", script::quote(&script.to_string_lossy()));
                cmd.args(["-nodisplay", "-nosplash", "-batch"]).arg(call);
            }
        }
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        cmd
    }
}

/// Executable plus interpreter flavour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub executable: PathBuf,
    pub kind: InterpreterType,
}

impl Interpreter {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        let kind = InterpreterType::detect(&executable);
        Self { executable, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_interpreter() {
        assert_eq!(InterpreterType::detect(Path::new("/usr/bin/octave")), InterpreterType::Octave);
        assert_eq!(InterpreterType::detect(Path::new("/usr/bin/octave-cli")), InterpreterType::Octave);
        assert_eq!(InterpreterType::detect(Path::new("C:/Octave/bin/Octave.exe")), InterpreterType::Octave);
        assert_eq!(InterpreterType::detect(Path::new("/opt/MATLAB/R2023b/bin/matlab")), InterpreterType::Matlab);
    }

    #[test]
    fn test_matlab_command_line() {
        let cmd = InterpreterType::Matlab.command(Path::new("matlab"), Path::new("/tmp/it's/run.m"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-nodisplay", "-nosplash", "-batch", "run('/tmp/it''s/run.m')"]);
    }
}
