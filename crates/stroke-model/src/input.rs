//! Raw stylus input samples.
//!
//! Inputs are exchanged as JSONL, one sample per line:
//!
//! ```text
//! {"type":"down","x":0.0,"y":0.0,"t":0.0,"pressure":0.8}
//! {"type":"move","x":1.5,"y":0.2,"t":0.008,"pressure":0.82,"tilt":0.4}
//! {"type":"up","x":3.0,"y":0.4,"t":0.016}
//! ```
//!
//! Stylus channels that a device does not report are simply omitted.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::time::Time;

/// Position of a sample within its stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEventType {
    Down,
    Move,
    Up,
}

/// A single raw stylus sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelerInput {
    #[serde(rename = "type")]
    pub event_type: InputEventType,

    #[serde(flatten)]
    pub position: Vec2,

    /// Seconds; strictly increasing within one stroke.
    #[serde(rename = "t")]
    pub time: Time,

    /// Normalized pressure in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,

    /// Radians from perpendicular, `[0, π/2]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,

    /// Radians, `[0, 2π)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,
}

impl ModelerInput {
    /// A sample with no stylus state.
    pub fn new(event_type: InputEventType, position: Vec2, time: Time) -> Self {
        Self {
            event_type,
            position,
            time,
            pressure: None,
            tilt: None,
            orientation: None,
        }
    }

    pub fn down(x: f64, y: f64, t: f64) -> Self {
        Self::new(InputEventType::Down, Vec2::new(x, y), Time(t))
    }

    pub fn moved(x: f64, y: f64, t: f64) -> Self {
        Self::new(InputEventType::Move, Vec2::new(x, y), Time(t))
    }

    pub fn up(x: f64, y: f64, t: f64) -> Self {
        Self::new(InputEventType::Up, Vec2::new(x, y), Time(t))
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = Some(tilt);
        self
    }

    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Iterate over the samples of a JSONL document, yielding the 1-based line
/// number alongside each parse result. Blank lines and `#` comments are
/// skipped.
pub fn parse_input_lines(
    jsonl: &str,
) -> impl Iterator<Item = (usize, Result<ModelerInput, serde_json::Error>)> + '_ {
    jsonl
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| (number, serde_json::from_str(line)))
}

/// Parse all samples from JSONL content, failing on the first bad line.
pub fn parse_inputs(jsonl: &str) -> Result<Vec<ModelerInput>, serde_json::Error> {
    parse_input_lines(jsonl).map(|(_, parsed)| parsed).collect()
}
