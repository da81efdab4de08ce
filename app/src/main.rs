use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use logicsim::{SavedCircuit, Strategy};
use uuid::Uuid;

mod config;
mod runner;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Auto,
    CombinationalOnly,
    EventDriven,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => Strategy::AutoSelect,
            StrategyArg::CombinationalOnly => Strategy::CombinationalOnly,
            StrategyArg::EventDriven => Strategy::EventDriven,
        }
    }
}

/// Evaluate a saved logic circuit.
#[derive(Parser)]
#[command(name = "logicsim")]
#[command(version)]
struct Cli {
    /// Saved circuit (JSON)
    circuit: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "LOGICSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Drive the circuit for this many clock ticks instead of a single pass
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Set an INPUT gate before evaluating, as `<gate id>=<0|1>`
    #[arg(long = "set", value_parser = parse_assignment)]
    inputs: Vec<(Uuid, bool)>,

    /// Override the configured evaluation strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Write the evaluated circuit here
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Save the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,
}

fn parse_assignment(s: &str) -> Result<(Uuid, bool)> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <gate id>=<0|1>, got '{}'", s))?;
    let id = Uuid::parse_str(id.trim()).with_context(|| format!("bad gate id '{}'", id))?;
    let value = match value.trim() {
        "1" | "true" | "high" => true,
        "0" | "false" | "low" => false,
        other => return Err(anyhow!("bad value '{}'", other)),
    };
    Ok((id, value))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut app_config = config::load_config(cli.config.as_deref());
    if let Some(strategy) = cli.strategy {
        app_config.engine.strategy = strategy.into();
    }
    if cli.save_config {
        config::save_config(&app_config, cli.config.as_deref());
    }

    let mut saved = SavedCircuit::from_file(&cli.circuit)
        .with_context(|| format!("Failed to load {}", cli.circuit.display()))?;
    runner::apply_inputs(&mut saved.circuit, &cli.inputs)?;

    let evaluated = match cli.ticks {
        Some(ticks) => runner::run_ticks(&saved, &app_config, ticks)?,
        None => runner::run_once(&saved, &app_config),
    };
    print!("{}", runner::describe_long(&evaluated.circuit));

    if let Some(out) = &cli.out {
        evaluated
            .to_file(out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }
    Ok(())
}
