//! Validate a modeler configuration file.

use std::path::PathBuf;

use inkstroke_common::read_json_file;
use inkstroke_model::StrokeModelConfig;
use inkstroke_modeler::params::ModelerParams;
use inkstroke_modeler::ModelerError;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating configuration at: {}", path.display());

    let config: StrokeModelConfig = read_json_file(&path)?;

    match ModelerParams::resolve(&config) {
        Ok(params) => {
            println!("\nResolved parameters:");
            println!("{}", serde_json::to_string_pretty(&params)?);
            println!("\nConfiguration is valid.");
            Ok(())
        }
        Err(e) => {
            let issues = issues(&e);
            println!("\nValidation issues:");
            for issue in &issues {
                println!("  - {issue}");
            }
            anyhow::bail!("{} issue(s) found", issues.len())
        }
    }
}

/// Split a combined parameter error back into its individual problems.
fn issues(error: &ModelerError) -> Vec<String> {
    match error {
        ModelerError::InvalidParams { message } => {
            message.split("; ").map(str::to_string).collect()
        }
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_issue_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{
                "position_modeler": {"drag_constant": 0.0},
                "sampling": {"min_output_rate": "NaN", "end_of_stroke_max_iterations": 5000}
            }"#,
        )
        .unwrap();

        // The string "NaN" is not a number; the file itself is rejected.
        assert!(run(path.clone()).is_err());

        std::fs::write(
            &path,
            r#"{
                "position_modeler": {"drag_constant": 0.0},
                "sampling": {"end_of_stroke_max_iterations": 5000}
            }"#,
        )
        .unwrap();
        let config: StrokeModelConfig = read_json_file(&path).unwrap();
        let err = ModelerParams::resolve(&config).unwrap_err();
        assert_eq!(issues(&err).len(), 2);
        assert!(run(path).is_err());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        run(path).unwrap();
    }
}
