//! `umbra_conformance`: Proxy conformance scenario runner for the Umbra
//! engine.
//!
//! Runs the built-in scenario catalogue, printing one `PASS`/`FAIL` line per
//! scenario and a summary.  Exits with status 1 if any scenario failed.

mod scenarios;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use umbra_core::config::IsolateConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Run the Umbra Proxy conformance scenarios")]
struct Cli {
    /// Only run scenarios whose name contains this substring.
    #[arg(long)]
    filter: Option<String>,

    /// Print the selected scenario names and exit.
    #[arg(long)]
    list: bool,

    /// Override the isolate's call-depth limit (defaults to
    /// `UMBRA_MAX_CALL_DEPTH` or the built-in default).
    #[arg(long)]
    max_call_depth: Option<usize>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.max_call_depth {
        Some(depth) => IsolateConfig::with_max_call_depth(depth),
        None => IsolateConfig::from_env(),
    };

    let selected: Vec<_> = scenarios::catalogue()
        .into_iter()
        .filter(|s| cli.filter.as_deref().is_none_or(|f| s.name.contains(f)))
        .collect();

    if cli.list {
        for scenario in &selected {
            println!("{}", scenario.name);
        }
        return ExitCode::SUCCESS;
    }

    let mut failed = 0usize;
    for scenario in &selected {
        match (scenario.run)(&config) {
            Ok(()) => println!("PASS {}", scenario.name),
            Err(reason) => {
                failed += 1;
                println!("FAIL {}: {reason}", scenario.name);
            }
        }
    }

    println!(
        "\n{} scenarios: {} passed, {} failed",
        selected.len(),
        selected.len() - failed,
        failed
    );

    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
