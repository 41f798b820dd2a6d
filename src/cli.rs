use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "bctbridge", about = "Brain Connectivity Toolbox analyses via MATLAB/Octave", version)]
pub struct Cli {
    /// Config file to use instead of ~/.config/bctbridge/.bctrc.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Plain output without colors or Markdown rendering.
    #[arg(long = "no-md", global = true)]
    pub no_md: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List analysis variants, optionally only those accepting a connectivity.
    List {
        /// Connectivity file (.json or whitespace-separated weights).
        #[arg(long)]
        connectivity: Option<PathBuf>,
    },

    /// Show the inputs, snippet and outputs of one variant.
    Describe {
        /// Variant id, e.g. modularity_dir.
        id: String,

        /// Print the descriptor as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report whether the MATLAB/Octave engine is configured.
    Check,

    /// Run one variant on a connectivity.
    Run {
        /// Variant id, e.g. distance_bin.
        id: String,

        /// Connectivity file (.json or whitespace-separated weights).
        #[arg(long)]
        connectivity: PathBuf,

        /// Extra scalar parameter passed to the snippet, NAME=VALUE.
        /// Can be used multiple times.
        #[arg(long = "param", value_parser = parse_param, action = clap::ArgAction::Append)]
        params: Vec<(String, f64)>,

        /// Write outputs as JSON to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("'{name}' is not a valid variable name"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.to_string(), value))
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("gamma=1.5"), Ok(("gamma".to_string(), 1.5)));
        assert!(parse_param("gamma").is_err());
        assert!(parse_param("1x=2").is_err());
        assert!(parse_param("g=abc").is_err());
    }

    #[test]
    fn test_run_arguments() {
        let cli = <Cli as Parser>::try_parse_from([
            "bctbridge", "run", "distance_bin", "--connectivity", "w.txt", "--param", "k=2", "-o", "out.json",
        ])
        .unwrap();
        match cli.command {
            Command::Run { id, params, output, .. } => {
                assert_eq!(id, "distance_bin");
                assert_eq!(params, vec![("k".to_string(), 2.0)]);
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
