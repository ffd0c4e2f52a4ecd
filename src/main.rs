// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS GST germ selection
//!
//! # Usage
//!
//! ```bash
//! # Select germs for the configured model pack
//! qubit-os-gst select
//!
//! # Select with a custom config
//! qubit-os-gst select --config /path/to/gst.yaml
//!
//! # Test whether the configured germ list is amplificationally complete
//! qubit-os-gst check --length 8
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use qubit_os_gst::diagnostics::TracingDiagnostics;
use qubit_os_gst::germsel::{
    randomize_model_list, test_germ_list_finite_l, test_germ_list_infinite_l, GermOptimizer,
    SearchOutcome,
};
use qubit_os_gst::logging::init_logging;
use qubit_os_gst::{Config, Result, VERSION};

/// QubitOS gate set tomography germ selection
#[derive(Parser)]
#[command(name = "qubit-os-gst")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Germ selection for gate set tomography")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "QUBITOS_GST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run germ selection and print the result as JSON
    Select {
        /// Randomization seed
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum search iterations
        #[arg(long)]
        max_iter: Option<usize>,
    },

    /// Test amplificational completeness of the configured germ list
    Check {
        /// Germ power for a finite-length test (infinite-length when omitted)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Validate) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    match cli.command {
        Commands::Select { seed, max_iter } => {
            init_logging(&config.logging)?;
            if let Some(seed) = seed {
                config.germ_selection.seed = seed;
            }
            if let Some(max_iter) = max_iter {
                config.germ_selection.max_iter = max_iter;
            }

            let pack = config.run.model_pack()?;
            let germs = config.run.candidate_germs(pack)?;
            let model = pack.model()?;
            let optimizer = GermOptimizer::new(config.germ_selection.to_germ_selection_config()?)?;
            let diagnostics = TracingDiagnostics::new(config.germ_selection.verbosity);

            info!(
                version = VERSION,
                model_pack = %pack,
                num_germs = germs.len(),
                "Starting germ selection"
            );

            let result = optimizer.optimize(&[model], &germs, None, &diagnostics)?;
            println!("{}", serde_json::to_string_pretty(&result.summary())?);

            if matches!(result.outcome, SearchOutcome::Incomplete { .. }) {
                std::process::exit(1);
            }
        }

        Commands::Check { length } => {
            init_logging(&config.logging)?;
            let gs = config.germ_selection.to_germ_selection_config()?;
            let pack = config.run.model_pack()?;
            let germs = config.run.candidate_germs(pack)?;
            let target = pack.model()?;
            let model = if gs.randomize {
                randomize_model_list(&[target], gs.randomization_strength, None, gs.seed)?
                    .remove(0)
            } else {
                target
            };

            let report = match length {
                Some(length) => {
                    test_germ_list_finite_l(&model, &germs, length, None, 1.0 / gs.threshold)?
                }
                None => {
                    let diagnostics = TracingDiagnostics::new(config.germ_selection.verbosity);
                    test_germ_list_infinite_l(
                        &model,
                        &germs,
                        gs.score_function,
                        None,
                        gs.threshold,
                        gs.check,
                        &diagnostics,
                    )?
                }
            };

            let output = serde_json::json!({
                "model_pack": pack.name(),
                "num_germs": germs.len(),
                "length": length,
                "complete": report.complete,
                "spectrum": report.spectrum,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);

            if !report.complete {
                std::process::exit(1);
            }
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
