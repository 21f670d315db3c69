//! Resolution of [`StrokeModelConfig`] into validated parameters.
//!
//! The pipeline never looks at the optional config fields directly. They are
//! folded into [`ModelerParams`] once, with every rule violation collected
//! into a single [`ModelerError::InvalidParams`].

use inkstroke_model::config::defaults;
use inkstroke_model::{
    ConfidenceConfig, Duration, KalmanPredictorConfig, PredictionConfig, StrokeModelConfig,
};
use serde::Serialize;

use crate::error::ModelerError;

/// Fully-resolved modeler parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelerParams {
    pub wobble: WobbleParams,
    pub position: PositionParams,
    pub sampling: SamplingParams,
    pub stylus_state: StylusStateParams,
    pub prediction: PredictionParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WobbleParams {
    /// Non-positive disables smoothing.
    pub timeout: Duration,
    pub speed_floor: f64,
    pub speed_ceiling: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionParams {
    pub spring_mass_constant: f64,
    pub drag_constant: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub min_output_rate: f64,
    pub end_of_stroke_stopping_distance: f64,
    pub end_of_stroke_max_iterations: usize,
    pub max_outputs_per_call: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StylusStateParams {
    pub max_input_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionParams {
    StrokeEnd,
    Kalman(KalmanParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KalmanParams {
    pub process_noise: f64,
    pub measurement_noise: f64,
    pub min_stable_iteration: usize,
    pub max_time_samples: usize,
    pub min_catchup_velocity: f64,
    pub acceleration_weight: f64,
    pub jerk_weight: f64,
    pub prediction_interval: Duration,
    pub confidence: ConfidenceParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceParams {
    pub desired_number_of_samples: usize,
    pub max_estimation_distance: f64,
    pub min_travel_speed: f64,
    pub max_travel_speed: f64,
    pub max_linear_deviation: f64,
    pub baseline_linearity_confidence: f64,
}

impl Default for ModelerParams {
    fn default() -> Self {
        Self {
            wobble: WobbleParams {
                timeout: Duration(defaults::WOBBLE_TIMEOUT),
                speed_floor: defaults::WOBBLE_SPEED_FLOOR,
                speed_ceiling: defaults::WOBBLE_SPEED_CEILING,
            },
            position: PositionParams {
                spring_mass_constant: defaults::SPRING_MASS_CONSTANT,
                drag_constant: defaults::DRAG_CONSTANT,
            },
            sampling: SamplingParams {
                min_output_rate: defaults::MIN_OUTPUT_RATE,
                end_of_stroke_stopping_distance: defaults::END_OF_STROKE_STOPPING_DISTANCE,
                end_of_stroke_max_iterations: defaults::END_OF_STROKE_MAX_ITERATIONS as usize,
                max_outputs_per_call: defaults::MAX_OUTPUTS_PER_CALL as usize,
            },
            stylus_state: StylusStateParams {
                max_input_samples: defaults::MAX_INPUT_SAMPLES as usize,
            },
            prediction: PredictionParams::StrokeEnd,
        }
    }
}

impl ModelerParams {
    /// Validate `config` and substitute defaults for unset fields.
    pub fn resolve(config: &StrokeModelConfig) -> Result<Self, ModelerError> {
        let mut r = Resolver::default();

        let wobble_config = &config.wobble_smoother;
        let wobble = WobbleParams {
            timeout: Duration(r.finite(
                "wobble_smoother.timeout",
                wobble_config.timeout,
                defaults::WOBBLE_TIMEOUT,
            )),
            speed_floor: r.positive(
                "wobble_smoother.speed_floor",
                wobble_config.speed_floor,
                defaults::WOBBLE_SPEED_FLOOR,
            ),
            speed_ceiling: r.positive(
                "wobble_smoother.speed_ceiling",
                wobble_config.speed_ceiling,
                defaults::WOBBLE_SPEED_CEILING,
            ),
        };
        if wobble.speed_floor >= wobble.speed_ceiling {
            r.fail(format!(
                "wobble_smoother.speed_floor ({}) must be less than speed_ceiling ({})",
                wobble.speed_floor, wobble.speed_ceiling
            ));
        }

        let position = PositionParams {
            spring_mass_constant: r.positive(
                "position_modeler.spring_mass_constant",
                config.position_modeler.spring_mass_constant,
                defaults::SPRING_MASS_CONSTANT,
            ),
            drag_constant: r.positive(
                "position_modeler.drag_constant",
                config.position_modeler.drag_constant,
                defaults::DRAG_CONSTANT,
            ),
        };

        let sampling_config = &config.sampling;
        let sampling = SamplingParams {
            min_output_rate: r.positive(
                "sampling.min_output_rate",
                sampling_config.min_output_rate,
                defaults::MIN_OUTPUT_RATE,
            ),
            end_of_stroke_stopping_distance: r.positive(
                "sampling.end_of_stroke_stopping_distance",
                sampling_config.end_of_stroke_stopping_distance,
                defaults::END_OF_STROKE_STOPPING_DISTANCE,
            ),
            end_of_stroke_max_iterations: r.count(
                "sampling.end_of_stroke_max_iterations",
                sampling_config.end_of_stroke_max_iterations,
                defaults::END_OF_STROKE_MAX_ITERATIONS,
            ),
            max_outputs_per_call: r.count(
                "sampling.max_outputs_per_call",
                sampling_config.max_outputs_per_call,
                defaults::MAX_OUTPUTS_PER_CALL,
            ),
        };
        let iteration_limit = defaults::MAX_END_OF_STROKE_ITERATIONS_LIMIT as usize;
        if sampling.end_of_stroke_max_iterations > iteration_limit {
            r.fail(format!(
                "sampling.end_of_stroke_max_iterations ({}) must be at most {iteration_limit}",
                sampling.end_of_stroke_max_iterations
            ));
        }

        let stylus_state = StylusStateParams {
            max_input_samples: r.count(
                "stylus_state_modeler.max_input_samples",
                config.stylus_state_modeler.max_input_samples,
                defaults::MAX_INPUT_SAMPLES,
            ),
        };

        let prediction = match &config.prediction {
            PredictionConfig::StrokeEnd => PredictionParams::StrokeEnd,
            PredictionConfig::Kalman(kalman) => {
                PredictionParams::Kalman(resolve_kalman(&mut r, kalman))
            }
        };

        r.finish()?;
        Ok(Self {
            wobble,
            position,
            sampling,
            stylus_state,
            prediction,
        })
    }
}

fn resolve_kalman(r: &mut Resolver, config: &KalmanPredictorConfig) -> KalmanParams {
    let params = KalmanParams {
        process_noise: r.positive(
            "prediction.process_noise",
            config.process_noise,
            defaults::PROCESS_NOISE,
        ),
        measurement_noise: r.positive(
            "prediction.measurement_noise",
            config.measurement_noise,
            defaults::MEASUREMENT_NOISE,
        ),
        min_stable_iteration: r.count(
            "prediction.min_stable_iteration",
            config.min_stable_iteration,
            defaults::MIN_STABLE_ITERATION,
        ),
        max_time_samples: r.count(
            "prediction.max_time_samples",
            config.max_time_samples,
            defaults::MAX_TIME_SAMPLES,
        ),
        min_catchup_velocity: r.positive(
            "prediction.min_catchup_velocity",
            config.min_catchup_velocity,
            defaults::MIN_CATCHUP_VELOCITY,
        ),
        acceleration_weight: r.finite(
            "prediction.acceleration_weight",
            config.acceleration_weight,
            defaults::ACCELERATION_WEIGHT,
        ),
        jerk_weight: r.finite(
            "prediction.jerk_weight",
            config.jerk_weight,
            defaults::JERK_WEIGHT,
        ),
        prediction_interval: Duration(r.positive(
            "prediction.prediction_interval",
            config.prediction_interval,
            defaults::PREDICTION_INTERVAL,
        )),
        confidence: resolve_confidence(r, &config.confidence),
    };
    if params.max_time_samples < 2 {
        r.fail(format!(
            "prediction.max_time_samples ({}) must be at least 2",
            params.max_time_samples
        ));
    }
    params
}

fn resolve_confidence(r: &mut Resolver, config: &ConfidenceConfig) -> ConfidenceParams {
    let params = ConfidenceParams {
        desired_number_of_samples: r.count(
            "prediction.confidence.desired_number_of_samples",
            config.desired_number_of_samples,
            defaults::DESIRED_NUMBER_OF_SAMPLES,
        ),
        max_estimation_distance: r.positive(
            "prediction.confidence.max_estimation_distance",
            config.max_estimation_distance,
            defaults::MAX_ESTIMATION_DISTANCE,
        ),
        min_travel_speed: r.positive(
            "prediction.confidence.min_travel_speed",
            config.min_travel_speed,
            defaults::MIN_TRAVEL_SPEED,
        ),
        max_travel_speed: r.positive(
            "prediction.confidence.max_travel_speed",
            config.max_travel_speed,
            defaults::MAX_TRAVEL_SPEED,
        ),
        max_linear_deviation: r.positive(
            "prediction.confidence.max_linear_deviation",
            config.max_linear_deviation,
            defaults::MAX_LINEAR_DEVIATION,
        ),
        baseline_linearity_confidence: r.finite(
            "prediction.confidence.baseline_linearity_confidence",
            config.baseline_linearity_confidence,
            defaults::BASELINE_LINEARITY_CONFIDENCE,
        ),
    };
    if params.min_travel_speed >= params.max_travel_speed {
        r.fail(format!(
            "prediction.confidence.min_travel_speed ({}) must be less than max_travel_speed ({})",
            params.min_travel_speed, params.max_travel_speed
        ));
    }
    if !(0.0..=1.0).contains(&params.baseline_linearity_confidence) {
        r.fail(format!(
            "prediction.confidence.baseline_linearity_confidence ({}) must be within [0, 1]",
            params.baseline_linearity_confidence
        ));
    }
    params
}

/// Accumulates rule violations while resolving fields.
#[derive(Default)]
struct Resolver {
    errors: Vec<String>,
}

impl Resolver {
    fn fail(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Positive or unset: negative means default, zero and non-finite fail.
    fn positive(&mut self, name: &str, value: Option<f64>, default: f64) -> f64 {
        match value {
            None => default,
            Some(v) if !v.is_finite() => {
                self.fail(format!("{name} must be finite, got {v}"));
                default
            }
            Some(v) if v < 0.0 => default,
            Some(v) if v == 0.0 => {
                self.fail(format!("{name} must be positive or unset, got 0"));
                default
            }
            Some(v) => v,
        }
    }

    fn count(&mut self, name: &str, value: Option<i64>, default: i64) -> usize {
        match value {
            None => default as usize,
            Some(v) if v < 0 => default as usize,
            Some(0) => {
                self.fail(format!("{name} must be positive or unset, got 0"));
                default as usize
            }
            Some(v) => usize::try_from(v).unwrap_or(usize::MAX),
        }
    }

    fn finite(&mut self, name: &str, value: Option<f64>, default: f64) -> f64 {
        match value {
            None => default,
            Some(v) if !v.is_finite() => {
                self.fail(format!("{name} must be finite, got {v}"));
                default
            }
            Some(v) => v,
        }
    }

    fn finish(self) -> Result<(), ModelerError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ModelerError::invalid_params(self.errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstroke_model::{SamplingConfig, WobbleSmootherConfig};

    #[test]
    fn test_empty_config_resolves_to_defaults() {
        let params = ModelerParams::resolve(&StrokeModelConfig::default()).unwrap();
        assert_eq!(params.wobble.timeout, Duration(0.04));
        assert!((params.position.spring_mass_constant - 11.0 / 32400.0).abs() < 1e-15);
        assert_eq!(params.position.drag_constant, 72.0);
        assert_eq!(params.sampling.min_output_rate, 180.0);
        assert_eq!(params.sampling.end_of_stroke_max_iterations, 20);
        assert_eq!(params.sampling.max_outputs_per_call, 100_000);
        assert_eq!(params.stylus_state.max_input_samples, 10);
        assert_eq!(params.prediction, PredictionParams::StrokeEnd);
        assert_eq!(params, ModelerParams::default());
    }

    #[test]
    fn test_negative_means_default() {
        let config = StrokeModelConfig {
            sampling: SamplingConfig {
                min_output_rate: Some(-1.0),
                end_of_stroke_max_iterations: Some(-1),
                ..Default::default()
            },
            ..Default::default()
        };
        let params = ModelerParams::resolve(&config).unwrap();
        assert_eq!(params.sampling.min_output_rate, 180.0);
        assert_eq!(params.sampling.end_of_stroke_max_iterations, 20);
    }

    #[test]
    fn test_zero_is_rejected_and_all_errors_are_reported() {
        let config = StrokeModelConfig {
            sampling: SamplingConfig {
                min_output_rate: Some(0.0),
                end_of_stroke_stopping_distance: Some(f64::NAN),
                end_of_stroke_max_iterations: Some(5000),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = ModelerParams::resolve(&config).unwrap_err();
        let ModelerError::InvalidParams { message } = err else {
            panic!("expected InvalidParams, got {err:?}");
        };
        assert!(message.contains("sampling.min_output_rate"));
        assert!(message.contains("sampling.end_of_stroke_stopping_distance"));
        assert!(message.contains("at most 1000"));
    }

    #[test]
    fn test_wobble_timeout_may_disable() {
        let config = StrokeModelConfig {
            wobble_smoother: WobbleSmootherConfig {
                timeout: Some(0.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let params = ModelerParams::resolve(&config).unwrap();
        assert_eq!(params.wobble.timeout, Duration(0.0));
    }

    #[test]
    fn test_speed_floor_must_be_below_ceiling() {
        let config = StrokeModelConfig {
            wobble_smoother: WobbleSmootherConfig {
                speed_floor: Some(2.0),
                speed_ceiling: Some(1.0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(ModelerParams::resolve(&config).is_err());
    }

    #[test]
    fn test_kalman_rules() {
        let mut kalman = KalmanPredictorConfig::populated();
        kalman.max_time_samples = Some(1);
        kalman.confidence.baseline_linearity_confidence = Some(1.5);
        kalman.confidence.min_travel_speed = Some(6.0);
        let config = StrokeModelConfig {
            prediction: PredictionConfig::Kalman(kalman),
            ..Default::default()
        };
        let err = ModelerParams::resolve(&config).unwrap_err().to_string();
        assert!(err.contains("max_time_samples"));
        assert!(err.contains("baseline_linearity_confidence"));
        assert!(err.contains("min_travel_speed"));
    }

    #[test]
    fn test_populated_kalman_resolves() {
        let params = ModelerParams::resolve(&StrokeModelConfig::populated_kalman()).unwrap();
        let PredictionParams::Kalman(kalman) = params.prediction else {
            panic!("expected kalman params");
        };
        assert_eq!(kalman.min_stable_iteration, 4);
        assert_eq!(kalman.prediction_interval, Duration(0.02));
        assert_eq!(kalman.confidence.max_travel_speed, 5000.0);
    }
}
