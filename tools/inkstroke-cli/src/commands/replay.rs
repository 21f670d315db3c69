//! Replay a recorded input stream through the stroke modeler.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use inkstroke_common::{read_json_file, InkstrokeError, InkstrokeResult};
use inkstroke_model::{parse_input_lines, InputEventType, ModelerResult, StrokeModelConfig};
use inkstroke_modeler::StrokeModeler;
use serde::Serialize;

/// First line of every replay output, written as a `#` comment.
#[derive(Debug, Serialize)]
struct ReplayHeader<'a> {
    tool_version: &'a str,
    generated_at: String,
    source: String,
    predictions: bool,
}

/// One output line: a modeled or predicted point and the input line that
/// produced it.
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    line: usize,
    predicted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(flatten)]
    result: &'a ModelerResult,
}

/// Counters reported once the stream is exhausted.
#[derive(Debug, Default)]
struct ReplaySummary {
    inputs: usize,
    strokes: usize,
    results: usize,
    predictions: usize,
    rejected: Vec<InkstrokeError>,
}

/// Writes result records as JSON lines.
struct ResultWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> ResultWriter<W> {
    fn new(mut writer: W, header: &ReplayHeader<'_>, pretty: bool) -> InkstrokeResult<Self> {
        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")?;
        Ok(Self { writer, pretty })
    }

    fn write(&mut self, record: &ResultRecord<'_>) -> InkstrokeResult<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        writeln!(self.writer, "{json}")?;
        Ok(())
    }

    fn finish(mut self) -> InkstrokeResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

pub fn run(
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    predict: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&input)
        .map_err(|_| anyhow::anyhow!("Input stream not found: {}", input.display()))?;

    let mut modeler = build_modeler(config.as_deref())?;
    tracing::debug!(params = ?modeler.params(), "modeler configured");

    let header = ReplayHeader {
        tool_version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: input.display().to_string(),
        predictions: predict,
    };

    let summary = match &output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = BufWriter::new(File::create(path)?);
            let mut writer = ResultWriter::new(file, &header, pretty)?;
            let summary = replay(&content, &mut modeler, predict, &mut writer)?;
            writer.finish()?;
            summary
        }
        None => {
            let stdout = std::io::stdout().lock();
            let mut writer = ResultWriter::new(stdout, &header, pretty)?;
            let summary = replay(&content, &mut modeler, predict, &mut writer)?;
            writer.finish()?;
            summary
        }
    };

    eprintln!("Replayed {}", input.display());
    eprintln!("  Inputs: {}", summary.inputs);
    eprintln!("  Strokes completed: {}", summary.strokes);
    eprintln!("  Results: {}", summary.results);
    if predict {
        eprintln!("  Predicted points: {}", summary.predictions);
    }
    if let Some(path) = &output {
        eprintln!("  Written to: {}", path.display());
    }
    if !summary.rejected.is_empty() {
        eprintln!("\n{} input(s) rejected:", summary.rejected.len());
        for error in &summary.rejected {
            eprintln!("  - {error}");
        }
    }

    Ok(())
}

fn build_modeler(config: Option<&Path>) -> InkstrokeResult<StrokeModeler> {
    let Some(path) = config else {
        return Ok(StrokeModeler::default());
    };
    let config: StrokeModelConfig = read_json_file(path)?;
    StrokeModeler::new(&config).map_err(|e| InkstrokeError::modeler(e.to_string()))
}

/// Feed every parsable line into `modeler`. Lines that fail to parse or that
/// the modeler rejects are collected in the summary and skipped.
fn replay<W: Write>(
    content: &str,
    modeler: &mut StrokeModeler,
    predict: bool,
    writer: &mut ResultWriter<W>,
) -> InkstrokeResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (line, parsed) in parse_input_lines(content) {
        summary.inputs += 1;
        let input = match parsed {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping unparsable input");
                summary.rejected.push(InkstrokeError::input(line, e.to_string()));
                continue;
            }
        };

        let results = match modeler.update(&input) {
            Ok(results) => results,
            Err(e) => {
                summary.rejected.push(InkstrokeError::input(line, e.to_string()));
                continue;
            }
        };

        for result in &results {
            writer.write(&ResultRecord {
                line,
                predicted: false,
                confidence: None,
                result,
            })?;
        }
        summary.results += results.len();
        if input.event_type == InputEventType::Up {
            summary.strokes += 1;
        }

        if predict {
            let points = modeler.predict_with_confidence();
            for point in &points {
                writer.write(&ResultRecord {
                    line,
                    predicted: true,
                    confidence: Some(point.confidence),
                    result: &point.result,
                })?;
            }
            summary.predictions += points.len();
        }
    }

    Ok(summary)
}
