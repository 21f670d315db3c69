//! Modeled stroke points.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::time::Time;

/// One smoothed, resampled point of a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelerResult {
    pub position: Vec2,
    pub velocity: Vec2,
    #[serde(rename = "t")]
    pub time: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,
}

impl ModelerResult {
    /// Speed in units per second.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}
