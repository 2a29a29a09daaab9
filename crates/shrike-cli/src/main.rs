use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shrike_witness::{ErrorWitness, WitnessBody};

#[derive(Parser)]
#[command(name = "shrike")]
#[command(about = "Violation-witness inspector for symbolic execution guidance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a witness and print its properties, shape and replay tape
    Inspect {
        /// Path to the witness file (.graphml or .yml)
        file: PathBuf,

        /// Emit the summary as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load a witness and report whether it is well-formed
    Validate {
        /// Path to the witness file (.graphml or .yml)
        file: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { file, json } => inspect(&file, json),
        Commands::Validate { file } => validate(&file),
    }
}

fn inspect(file: &Path, json: bool) -> miette::Result<()> {
    let (witness, diagnostics) =
        ErrorWitness::load_with_diagnostics(file).map_err(miette::Report::new)?;

    if json {
        let summary = witness.summary();
        println!("{}", serde_json::to_string_pretty(&summary).expect("summary serializes"));
        return Ok(());
    }

    println!("Witness: {}", file.display());
    print!("  Properties:");
    for p in witness.properties() {
        print!(" {p}");
    }
    println!();
    if let Some(f) = witness.error_function() {
        println!("  Error function: {f}");
    }

    match &witness.body {
        WitnessBody::Automaton(automaton) => {
            print!("{automaton}");
            if automaton.deterministic() {
                println!("  Replay tape:");
                for entry in automaton.tape() {
                    println!(
                        "    {}@{} -> {}",
                        entry.function, entry.line, entry.value
                    );
                }
            }
            println!(
                "  Refutation mode: {}",
                if automaton.refutation_supported() {
                    "available"
                } else {
                    "disabled"
                }
            );
        }
        WitnessBody::Sequence(segments) => {
            println!("  Segments: {}", segments.len());
            for (i, segment) in segments.iter().enumerate() {
                println!(
                    "    S{i}: follow {} at {}:{} ({} to avoid)",
                    segment.follow.kind,
                    segment.follow.loc.line,
                    segment.follow.loc.column,
                    segment.avoid.len()
                );
            }
        }
    }

    for advisory in diagnostics.items() {
        println!("  warning[{}]: {}", advisory.code, advisory.message);
    }
    Ok(())
}

fn validate(file: &Path) -> miette::Result<()> {
    let (witness, diagnostics) =
        ErrorWitness::load_with_diagnostics(file).map_err(miette::Report::new)?;
    let summary = witness.summary();
    match summary.dialect.as_str() {
        "graph" => println!(
            "OK: graph witness, {} nodes, {} edges, deterministic={}, {} warning(s)",
            summary.node_count,
            summary.edge_count,
            summary.deterministic,
            diagnostics.items().len()
        ),
        _ => println!(
            "OK: sequence witness, {} segments, {} warning(s)",
            summary.segment_count,
            diagnostics.items().len()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
