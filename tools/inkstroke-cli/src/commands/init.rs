//! Write a modeler configuration with every field spelled out.

use std::path::{Path, PathBuf};

use inkstroke_common::write_json_file;
use inkstroke_model::{PredictionConfig, StrokeModelConfig};

pub fn run(output: PathBuf, kalman: bool, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite)",
            output.display()
        );
    }

    let config = default_config(kalman);
    write_config(&config, &output)?;

    println!("Configuration written to {}", output.display());
    println!(
        "  Predictor: {}",
        if kalman { "kalman" } else { "stroke_end" }
    );
    println!("  Negative numeric values fall back to the library default.");

    Ok(())
}

fn default_config(kalman: bool) -> StrokeModelConfig {
    if kalman {
        StrokeModelConfig::populated_kalman()
    } else {
        StrokeModelConfig::populated(PredictionConfig::StrokeEnd)
    }
}

fn write_config(config: &StrokeModelConfig, path: &Path) -> anyhow::Result<()> {
    write_json_file(path, config)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))
}
