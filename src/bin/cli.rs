//! Command-line interface for the petab-results library
//!
//! This binary reports the best parameter estimation results and generates synthetic
//! PEtab problems:
//! - Writing LaTeX tables of the best solution per group
//! - Printing the same selection to the terminal
//! - Generating a PEtab problem from a TOML model
//!
//! # Usage
//!
//! ```bash
//! # Write LaTeX tables
//! petab-results latex ifac_analysis_results.csv --output ifac_tables.tex
//!
//! # Print a summary to the terminal
//! petab-results summary ifac_analysis_results.csv
//!
//! # Generate a PEtab problem
//! petab-results petab model.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use petab_results::io::{load_results, write_document};
use petab_results::report::{
    render_console, render_report, ConsoleRenderer, GroupContext, LatexRenderer,
};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Write the best solution of every group as LaTeX tables
    Latex {
        /// Path to the results CSV
        input: PathBuf,

        /// Path of the LaTeX document to write
        #[arg(short, long, default_value = "ifac_tables.tex")]
        output: PathBuf,
    },
    /// Print the best solution of every group to the terminal
    Summary {
        /// Path to the results CSV
        #[arg(default_value = "ifac_analysis_results.csv")]
        input: PathBuf,
    },
    /// Generate a PEtab problem from a TOML model description
    #[cfg(feature = "simulation")]
    Petab {
        /// Path to the TOML model
        model: PathBuf,
    },
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Latex { input, output } => {
            let rows = load_results(input)?;
            let report = render_report(&rows, &LatexRenderer);
            write_document(&output, &report.text)?;
            println!("LaTeX tables successfully written to {}", output.display());
        }
        Commands::Summary { input } => {
            let rows = load_results(input)?;
            if rows.is_empty() {
                print!("{}", render_console(None, &GroupContext::default()));
                return Ok(());
            }
            let report = render_report(&rows, &ConsoleRenderer);
            print!("{}", report.text);
        }
        #[cfg(feature = "simulation")]
        Commands::Petab { model } => {
            let problem = petab_results::petab::generate_from_toml(model)?;
            println!("{problem}");
            println!(
                "PEtab problem successfully written to {}",
                problem.data.output_dir.display()
            );
        }
    }

    Ok(())
}
