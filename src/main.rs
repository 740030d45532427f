// SPDX-License-Identifier: PMPL-1.0-or-later

//! booby-trap: deterministic memory-defect corpus driver
//!
//! Thin shell around the scenario registry. `run` invokes one
//! scenario in-process (the process dying inside it is an accepted
//! outcome, not an error); `sweep` runs the whole corpus one child
//! process per scenario and records the raw outcomes without passing
//! judgement on them.

use anyhow::{bail, Context, Result};
use booby_trap::registry::Registry;
use booby_trap::trace::FAULT_SITE_MARKER;
use booby_trap::types::{ScenarioOutcome, SweepReport};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "booby-trap")]
#[command(version)]
#[command(about = "Deterministic ground-truth corpus of memory-safety defects")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered scenario
    List {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a single scenario
    Describe {
        /// Scenario id, e.g. free_not_at_buffer_start__union_alias
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Invoke a scenario in this process (it may not come back)
    Run {
        /// Scenario id to invoke
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Run the full corpus, one child process per scenario
    Sweep {
        /// Write the sweep report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = Registry::build();

    match cli.command {
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&registry.infos())?);
            } else {
                println!("{} scenarios registered\n", registry.len());
                for scenario in registry.scenarios() {
                    println!(
                        "  {}  {}",
                        format!("CWE{}", scenario.info.cwe).yellow(),
                        scenario.info.id
                    );
                }
            }
        }

        Commands::Describe { id } => {
            let Some(scenario) = registry.find(&id) else {
                bail!("unknown scenario: {}", id);
            };
            println!("Scenario: {}", scenario.info.id);
            println!("  Defect:  {}", scenario.info.kind);
            println!("  Variant: {}", scenario.info.variant);
            println!("  {}", scenario.info.description);
        }

        Commands::Run { id } => {
            let Some(scenario) = registry.find(&id) else {
                bail!("unknown scenario: {}", id);
            };
            println!("Running scenario: {}", scenario.info.id);
            scenario.invoke();
            println!("Scenario returned: {}", scenario.info.id);
        }

        Commands::Sweep { output } => {
            let exe = std::env::current_exe().context("locating own binary")?;
            println!("Sweeping {} scenarios\n", registry.len());

            let mut outcomes = Vec::with_capacity(registry.len());
            for scenario in registry.scenarios() {
                let start = Instant::now();
                let child = Command::new(&exe)
                    .arg("run")
                    .arg(&scenario.info.id)
                    .output()
                    .with_context(|| format!("spawning scenario {}", scenario.info.id))?;
                let duration = start.elapsed();

                let stdout = String::from_utf8_lossy(&child.stdout);
                let fault_site_reached = stdout.contains(FAULT_SITE_MARKER);
                let exit_code = child.status.code();
                let signal = child_signal(&child.status);

                let status_tag = match (exit_code, signal) {
                    (Some(0), _) => "exit 0".normal(),
                    (Some(code), _) => format!("exit {}", code).yellow(),
                    (None, Some(sig)) => format!("signal {}", sig).red(),
                    (None, None) => "terminated".red(),
                };
                let reach_tag = if fault_site_reached {
                    "fault site reached".green()
                } else {
                    "fault site NOT reached".red()
                };
                println!("  {:55} {:12} {}", scenario.info.id, status_tag, reach_tag);

                outcomes.push(ScenarioOutcome {
                    id: scenario.info.id.clone(),
                    kind: scenario.info.kind,
                    variant: scenario.info.variant,
                    exit_code,
                    signal,
                    fault_site_reached,
                    duration,
                });
            }

            let reached = outcomes.iter().filter(|o| o.fault_site_reached).count();
            println!("\n{}/{} scenarios reached their fault site", reached, outcomes.len());

            if let Some(output_path) = output {
                let report = SweepReport {
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    corpus_version: env!("CARGO_PKG_VERSION").to_string(),
                    outcomes,
                };
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&output_path, json)
                    .with_context(|| format!("writing {}", output_path.display()))?;
                println!("Report saved to: {}", output_path.display());
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn child_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn child_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
