mod cli;
mod printer;

use std::fs;

use anyhow::{bail, Context, Result};
use bctbridge::{
    bct::{BctAdapter, Connectivity, Registry},
    config::Config,
    execution::{EngineValue, Parameters},
    logging,
    process::OctaveEngine,
};
use is_terminal::IsTerminal;
use printer::{descriptor_markdown, MarkdownPrinter, TextPrinter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let cfg = match &args.config {
        Some(path) => Config::load_from(path.clone()),
        None => Config::load(),
    };
    logging::init(&cfg.log_filter());

    let registry = Registry::builtin();
    let pretty = !args.no_md && std::io::stdout().is_terminal();
    let text = TextPrinter { color: pretty };

    match args.command {
        cli::Command::List { connectivity } => {
            let conn = connectivity
                .as_deref()
                .map(Connectivity::load)
                .transpose()
                .context("loading connectivity")?;
            let mut last_group = None;
            let variants: Vec<_> = match &conn {
                Some(c) => registry.applicable(c).collect(),
                None => registry.iter().collect(),
            };
            for d in variants {
                if last_group != Some(&d.group) {
                    text.heading(&format!("{} / {}", d.group.subsection, d.group.name));
                    last_group = Some(&d.group);
                }
                text.variant(d);
            }
            if !cfg.engine().is_available() {
                text.status(false, "engine not configured: set MATLAB_EXECUTABLE to run these analyses");
            }
            Ok(())
        }
        cli::Command::Describe { id, json } => {
            let d = registry.lookup(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(d)?);
            } else if pretty {
                MarkdownPrinter::default().print(&descriptor_markdown(d));
            } else {
                println!("{}", descriptor_markdown(d));
            }
            Ok(())
        }
        cli::Command::Check => {
            let engine = cfg.engine();
            match &engine.executable {
                Some(exe) if engine.is_available() => {
                    text.status(true, &format!("engine: {}", exe.display()));
                }
                _ => text.status(false, "engine: not configured (MATLAB_EXECUTABLE)"),
            }
            let bct_ok = engine.bct_path.is_dir();
            text.status(bct_ok, &format!("BCT path: {}", engine.bct_path.display()));
            Ok(())
        }
        cli::Command::Run {
            id,
            connectivity,
            params,
            output,
        } => {
            let d = registry.lookup(&id)?;
            let conn = Connectivity::load(&connectivity)
                .with_context(|| format!("loading connectivity {}", connectivity.display()))?;
            if !d.input_schema().accepts(&conn) {
                bail!("{} requires an undirected connectivity; {} is directed", d.id, conn.gid);
            }
            let engine_cfg = cfg.engine();
            if !BctAdapter::<OctaveEngine>::is_available(&engine_cfg) {
                bail!("MATLAB/Octave engine is not configured; set MATLAB_EXECUTABLE");
            }
            let engine = OctaveEngine::from_config(&engine_cfg)?;
            let mut adapter = BctAdapter::new(d, engine, engine_cfg.bct_path.clone());

            let extra: Parameters = params
                .into_iter()
                .map(|(k, v)| (k, EngineValue::Scalar(v)))
                .collect();
            d.check_parameters(&extra)?;
            let outputs = adapter
                .launch(&conn, extra)
                .await
                .with_context(|| format!("running {}", d.id))?;

            let json = serde_json::to_string_pretty(&outputs)?;
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    text.outputs(&outputs);
                    text.status(true, &format!("wrote {}", path.display()));
                }
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}
