//! Inkstroke CLI: replay recorded stylus input through the stroke modeler.
//!
//! Usage:
//!   inkstroke replay <INPUT>      Model a JSONL input stream
//!   inkstroke validate <CONFIG>   Resolve and check a modeler configuration
//!   inkstroke init                Write a configuration with every default

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use inkstroke_common::{config_file_path, InkstrokeError, ToolConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "inkstroke",
    about = "Smooth, resample and predict stylus strokes",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSONL input stream through the modeler
    Replay {
        /// Input stream, one sample per line
        input: PathBuf,

        /// Modeler configuration (JSON); library defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append predicted points after every accepted input
        #[arg(long)]
        predict: bool,

        /// Pretty-print each result
        #[arg(long)]
        pretty: bool,
    },

    /// Resolve a modeler configuration and report every problem
    Validate {
        /// Path to the configuration file
        config: PathBuf,
    },

    /// Write a configuration file populated with the library defaults
    Init {
        /// Output file
        #[arg(short, long, default_value = "inkstroke.json")]
        output: PathBuf,

        /// Select the Kalman predictor instead of stroke-end
        #[arg(long)]
        kalman: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = config_file_path();
    let (tool_config, load_error) = load_tool_config(&config_path, cli.verbose);
    inkstroke_common::logging::init_logging(&tool_config.logging);
    if let Some(e) = load_error {
        tracing::warn!(path = %config_path.display(), error = %e, "ignoring tool config");
    }

    match cli.command {
        Commands::Replay {
            input,
            config,
            output,
            predict,
            pretty,
        } => commands::replay::run(
            input,
            config,
            output,
            predict || tool_config.replay.include_predictions,
            pretty || tool_config.replay.pretty,
        ),
        Commands::Validate { config } => commands::validate::run(config),
        Commands::Init {
            output,
            kalman,
            force,
        } => commands::init::run(output, kalman, force),
    }
}

/// Tool settings from `path`, or the defaults plus the reason they could not
/// be loaded. Logging is not up yet, so the error is handed back.
fn load_tool_config(path: &Path, verbose: bool) -> (ToolConfig, Option<InkstrokeError>) {
    let (mut config, error) = match ToolConfig::try_load(path) {
        Ok(config) => (config, None),
        Err(e) => (ToolConfig::default(), Some(e)),
    };
    if verbose {
        config.logging.level = "debug".to_string();
    }
    (config, error)
}
