//! Stroke model configuration.
//!
//! Every numeric field is optional: `None` (or a missing JSON key) means
//! "use the library default". For fields that must be positive a negative
//! value is read the same way, so configs written against older tooling with
//! `-1` placeholders keep working. The values are resolved and validated once
//! by the modeler when it is constructed or reset.

use serde::{Deserialize, Serialize};

/// Top-level configuration for one stroke modeler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeModelConfig {
    pub wobble_smoother: WobbleSmootherConfig,
    pub position_modeler: PositionModelerConfig,
    pub sampling: SamplingConfig,
    pub stylus_state_modeler: StylusStateModelerConfig,
    pub prediction: PredictionConfig,
}

/// Low-speed jitter suppression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WobbleSmootherConfig {
    /// Length of the trailing averaging window, seconds. Zero or negative
    /// disables smoothing.
    pub timeout: Option<f64>,
    /// At or below this speed the moving average is used as-is.
    pub speed_floor: Option<f64>,
    /// At or above this speed the raw position is used as-is.
    pub speed_ceiling: Option<f64>,
}

/// Spring/drag simulation constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionModelerConfig {
    /// Ratio of the mass to the spring stiffness.
    pub spring_mass_constant: Option<f64>,
    pub drag_constant: Option<f64>,
}

/// Output cadence and end-of-stroke behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Minimum number of outputs per second of input.
    pub min_output_rate: Option<f64>,
    pub end_of_stroke_stopping_distance: Option<f64>,
    pub end_of_stroke_max_iterations: Option<i64>,
    pub max_outputs_per_call: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylusStateModelerConfig {
    /// Number of raw stylus samples retained for interpolation.
    pub max_input_samples: Option<i64>,
}

/// Which predictor to run. Exactly one variant is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionConfig {
    /// Prediction disabled; `predict` yields nothing.
    #[default]
    StrokeEnd,
    Kalman(KalmanPredictorConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanPredictorConfig {
    pub process_noise: Option<f64>,
    pub measurement_noise: Option<f64>,
    /// Updates required before any point is predicted.
    pub min_stable_iteration: Option<i64>,
    /// Observation times kept for estimating the sample interval.
    pub max_time_samples: Option<i64>,
    /// Below this modeled speed the prediction starts from the raw target.
    pub min_catchup_velocity: Option<f64>,
    pub acceleration_weight: Option<f64>,
    pub jerk_weight: Option<f64>,
    /// Spacing of predicted points, seconds.
    pub prediction_interval: Option<f64>,
    pub confidence: ConfidenceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub desired_number_of_samples: Option<i64>,
    pub max_estimation_distance: Option<f64>,
    pub min_travel_speed: Option<f64>,
    pub max_travel_speed: Option<f64>,
    pub max_linear_deviation: Option<f64>,
    pub baseline_linearity_confidence: Option<f64>,
}

/// Library defaults, shared by the modeler's resolution step and by tools
/// that write fully-populated configuration files.
pub mod defaults {
    pub const WOBBLE_TIMEOUT: f64 = 0.04;
    pub const WOBBLE_SPEED_FLOOR: f64 = 1.31;
    pub const WOBBLE_SPEED_CEILING: f64 = 1.44;

    pub const SPRING_MASS_CONSTANT: f64 = 11.0 / 32400.0;
    pub const DRAG_CONSTANT: f64 = 72.0;

    pub const MIN_OUTPUT_RATE: f64 = 180.0;
    pub const END_OF_STROKE_STOPPING_DISTANCE: f64 = 0.001;
    pub const END_OF_STROKE_MAX_ITERATIONS: i64 = 20;
    pub const MAX_END_OF_STROKE_ITERATIONS_LIMIT: i64 = 1000;
    pub const MAX_OUTPUTS_PER_CALL: i64 = 100_000;

    pub const MAX_INPUT_SAMPLES: i64 = 10;

    pub const PROCESS_NOISE: f64 = 1.0;
    pub const MEASUREMENT_NOISE: f64 = 1.0;
    pub const MIN_STABLE_ITERATION: i64 = 4;
    pub const MAX_TIME_SAMPLES: i64 = 20;
    pub const MIN_CATCHUP_VELOCITY: f64 = 0.02;
    pub const ACCELERATION_WEIGHT: f64 = 0.5;
    pub const JERK_WEIGHT: f64 = 0.1;
    pub const PREDICTION_INTERVAL: f64 = 0.02;

    pub const DESIRED_NUMBER_OF_SAMPLES: i64 = 20;
    pub const MAX_ESTIMATION_DISTANCE: f64 = 1.5;
    pub const MIN_TRAVEL_SPEED: f64 = 1.0;
    pub const MAX_TRAVEL_SPEED: f64 = 5000.0;
    pub const MAX_LINEAR_DEVIATION: f64 = 10.0;
    pub const BASELINE_LINEARITY_CONFIDENCE: f64 = 0.4;
}

impl StrokeModelConfig {
    /// A configuration with every field spelled out at its default, using
    /// the given predictor.
    pub fn populated(prediction: PredictionConfig) -> Self {
        use defaults::*;
        Self {
            wobble_smoother: WobbleSmootherConfig {
                timeout: Some(WOBBLE_TIMEOUT),
                speed_floor: Some(WOBBLE_SPEED_FLOOR),
                speed_ceiling: Some(WOBBLE_SPEED_CEILING),
            },
            position_modeler: PositionModelerConfig {
                spring_mass_constant: Some(SPRING_MASS_CONSTANT),
                drag_constant: Some(DRAG_CONSTANT),
            },
            sampling: SamplingConfig {
                min_output_rate: Some(MIN_OUTPUT_RATE),
                end_of_stroke_stopping_distance: Some(END_OF_STROKE_STOPPING_DISTANCE),
                end_of_stroke_max_iterations: Some(END_OF_STROKE_MAX_ITERATIONS),
                max_outputs_per_call: Some(MAX_OUTPUTS_PER_CALL),
            },
            stylus_state_modeler: StylusStateModelerConfig {
                max_input_samples: Some(MAX_INPUT_SAMPLES),
            },
            prediction,
        }
    }

    /// Convenience for the Kalman variant with all fields populated.
    pub fn populated_kalman() -> Self {
        Self::populated(PredictionConfig::Kalman(KalmanPredictorConfig::populated()))
    }
}

impl KalmanPredictorConfig {
    pub fn populated() -> Self {
        use defaults::*;
        Self {
            process_noise: Some(PROCESS_NOISE),
            measurement_noise: Some(MEASUREMENT_NOISE),
            min_stable_iteration: Some(MIN_STABLE_ITERATION),
            max_time_samples: Some(MAX_TIME_SAMPLES),
            min_catchup_velocity: Some(MIN_CATCHUP_VELOCITY),
            acceleration_weight: Some(ACCELERATION_WEIGHT),
            jerk_weight: Some(JERK_WEIGHT),
            prediction_interval: Some(PREDICTION_INTERVAL),
            confidence: ConfidenceConfig {
                desired_number_of_samples: Some(DESIRED_NUMBER_OF_SAMPLES),
                max_estimation_distance: Some(MAX_ESTIMATION_DISTANCE),
                min_travel_speed: Some(MIN_TRAVEL_SPEED),
                max_travel_speed: Some(MAX_TRAVEL_SPEED),
                max_linear_deviation: Some(MAX_LINEAR_DEVIATION),
                baseline_linearity_confidence: Some(BASELINE_LINEARITY_CONFIDENCE),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_all_defaults() {
        let config: StrokeModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StrokeModelConfig::default());
        assert_eq!(config.prediction, PredictionConfig::StrokeEnd);
        assert!(config.sampling.min_output_rate.is_none());
    }

    #[test]
    fn test_prediction_is_tagged() {
        let json = r#"{"prediction":{"kind":"kalman","process_noise":0.5,"confidence":{"max_travel_speed":8.0}}}"#;
        let config: StrokeModelConfig = serde_json::from_str(json).unwrap();
        match config.prediction {
            PredictionConfig::Kalman(kalman) => {
                assert_eq!(kalman.process_noise, Some(0.5));
                assert_eq!(kalman.measurement_noise, None);
                assert_eq!(kalman.confidence.max_travel_speed, Some(8.0));
            }
            other => panic!("expected kalman, got {other:?}"),
        }

        let stroke_end: PredictionConfig =
            serde_json::from_str(r#"{"kind":"stroke_end"}"#).unwrap();
        assert_eq!(stroke_end, PredictionConfig::StrokeEnd);
    }

    #[test]
    fn test_populated_roundtrip() {
        let config = StrokeModelConfig::populated_kalman();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: StrokeModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(
            parsed.sampling.end_of_stroke_max_iterations,
            Some(defaults::END_OF_STROKE_MAX_ITERATIONS)
        );
    }

    #[test]
    fn test_unknown_predictor_kind_is_rejected() {
        let result: Result<PredictionConfig, _> = serde_json::from_str(r#"{"kind":"linear"}"#);
        assert!(result.is_err());
    }
}
