use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cut_config::SelectionConfig;
use cut_core::CutEngine;

mod events;
mod report;
mod tracing_init;

#[derive(Parser)]
#[command(name = "cutflow", about = "Event selection cut-flow engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a selection to a file of events and print the cut-flow table
    Run {
        /// Path to the selection TOML file
        #[arg(short, long)]
        config: PathBuf,
        /// Path to the events file (one JSON object per line)
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Compile a selection without processing any events
    Check {
        /// Path to the selection TOML file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, events } => run(&config, &events),
        Commands::Check { config } => check(&config),
    }
}

fn run(config_path: &PathBuf, events_path: &PathBuf) -> Result<()> {
    let config = SelectionConfig::load(config_path)?;
    tracing_init::init_tracing(&config.logging)?;

    // Startup phase: every cut compiles or the run never starts.
    let engine = CutEngine::compile(&config).map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(
        selection = %config.name,
        cuts = config.cuts.len(),
        "selection compiled"
    );

    let accessor = events::build_accessor(&config);
    let mut report = report::CutFlowReport::new(
        &config.name,
        &engine.cut_names(),
        !config.triggers.is_empty(),
    );

    events::process_events(events_path, &config, |index, event| {
        let payload = engine.decide(&event, &accessor);
        tracing::debug!(
            event = index,
            passed = payload.decision.passed,
            "event decided"
        );
        report.record(&payload.decision);
    })?;

    println!("{}", report.render());
    Ok(())
}

fn check(config_path: &PathBuf) -> Result<()> {
    let config = SelectionConfig::load(config_path)?;
    tracing_init::init_tracing(&config.logging)?;
    let engine = CutEngine::compile(&config).map_err(|e| anyhow::anyhow!("{e}"))?;
    println!(
        "ok: selection `{}` compiled ({} cuts)",
        config.name,
        engine.cut_names().len()
    );
    Ok(())
}
