//! Constant-jerk Kalman filter over modeled tip positions.
//!
//! Each axis is filtered independently with the state vector
//! `[position, velocity, acceleration, jerk]ᵀ`, a unit time step, and a
//! position-only measurement. Rates therefore come out "per observation";
//! [`KalmanPredictor`] rescales them to seconds with the mean observation
//! interval.

use nalgebra::{SMatrix, SVector};

use inkstroke_model::{Duration, Time, Vec2};

use crate::history::History;
use crate::params::KalmanParams;
use crate::position::TipState;
use crate::predictor::confidence::ConfidenceEstimator;
use crate::predictor::{PredictedPoint, PredictionContext};
use crate::sampler::to_result_with;

/// 4-element state vector type
type State = SVector<f64, 4>;
/// 4x4 matrix type
type Matrix4 = SMatrix<f64, 4, 4>;

/// Confidence falls by this factor for every point further out.
const CONFIDENCE_DECAY: f64 = 0.8;
/// Prediction stops before the first point below this confidence.
const MIN_CONFIDENCE: f64 = 0.05;

/// Filter state for one axis.
#[derive(Debug, Clone, Copy)]
struct AxisFilter {
    state: State,
    covariance: Matrix4,
}

impl AxisFilter {
    fn at(position: f64) -> Self {
        Self {
            state: State::new(position, 0.0, 0.0, 0.0),
            covariance: Matrix4::identity(),
        }
    }

    fn update(&mut self, measurement: f64, model: &FilterModel) {
        // Predict: x = A x, P = A P Aᵀ + Q
        self.state = model.transition * self.state;
        self.covariance =
            model.transition * self.covariance * model.transition.transpose() + model.process_noise;

        // Correct against the position-only measurement (H = [1 0 0 0]).
        let innovation = measurement - self.state[0];
        let innovation_covariance = self.covariance[(0, 0)] + model.measurement_noise;
        let gain: State = self.covariance.column(0) / innovation_covariance;

        let correction = gain * self.covariance.row(0);
        self.state += gain * innovation;
        self.covariance -= correction;
    }
}

#[derive(Debug, Clone, Copy)]
struct FilterModel {
    transition: Matrix4,
    process_noise: Matrix4,
    measurement_noise: f64,
}

impl FilterModel {
    fn new(process_noise: f64, measurement_noise: f64) -> Self {
        // Unit time step.
        #[rustfmt::skip]
        let transition = Matrix4::new(
            1.0, 1.0, 0.5, 1.0 / 6.0,
            0.0, 1.0, 1.0, 0.5,
            0.0, 0.0, 1.0, 1.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let noise_gain = State::new(1.0 / 6.0, 0.5, 1.0, 1.0);
        Self {
            transition,
            process_noise: noise_gain * noise_gain.transpose() * process_noise,
            measurement_noise,
        }
    }
}

/// Kinematic estimate in seconds-based units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanEstimate {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub jerk: Vec2,
}

/// Two-axis constant-jerk filter.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    model: FilterModel,
    axes: Option<[AxisFilter; 2]>,
    updates: usize,
}

impl KalmanFilter {
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            model: FilterModel::new(process_noise, measurement_noise),
            axes: None,
            updates: 0,
        }
    }

    pub fn reset(&mut self) {
        self.axes = None;
        self.updates = 0;
    }

    /// Number of observations since the last reset.
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn update(&mut self, position: Vec2) {
        match &mut self.axes {
            None => self.axes = Some([AxisFilter::at(position.x), AxisFilter::at(position.y)]),
            Some([x, y]) => {
                x.update(position.x, &self.model);
                y.update(position.y, &self.model);
            }
        }
        self.updates += 1;
    }

    /// Current estimate with rates rescaled from per-observation to
    /// per-second using `interval`.
    pub fn estimate(&self, interval: Duration) -> Option<KalmanEstimate> {
        let [x, y] = self.axes.as_ref()?;
        let dt = interval.as_secs();
        let component = |i: usize, scale: f64| Vec2::new(x.state[i], y.state[i]) / scale;
        Some(KalmanEstimate {
            position: component(0, 1.0),
            velocity: component(1, dt),
            acceleration: component(2, dt * dt),
            jerk: component(3, dt * dt * dt),
        })
    }
}

/// Predicts the continuation of a stroke from a Kalman estimate of the
/// modeled tip.
#[derive(Debug, Clone)]
pub struct KalmanPredictor {
    params: KalmanParams,
    max_outputs: usize,
    filter: KalmanFilter,
    times: History<Time>,
    positions: History<Vec2>,
    confidence: ConfidenceEstimator,
}

impl KalmanPredictor {
    pub fn new(params: KalmanParams, max_outputs: usize) -> Self {
        Self {
            filter: KalmanFilter::new(params.process_noise, params.measurement_noise),
            times: History::new(params.max_time_samples),
            positions: History::new(params.max_time_samples),
            confidence: ConfidenceEstimator::new(params.confidence),
            params,
            max_outputs,
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.times.clear();
        self.positions.clear();
    }

    pub fn update(&mut self, state: TipState) {
        self.filter.update(state.position);
        self.times.push(state.time);
        self.positions.push(state.position);
    }

    pub fn updates(&self) -> usize {
        self.filter.updates()
    }

    /// Mean spacing of the retained observation times.
    fn mean_interval(&self) -> Option<Duration> {
        let (oldest, newest) = (self.times.oldest()?, self.times.newest()?);
        let intervals = self.times.len().checked_sub(1).filter(|n| *n > 0)?;
        let mean = (*newest - *oldest).as_secs() / intervals as f64;
        (mean.is_finite() && mean > 0.0).then_some(Duration(mean))
    }

    pub fn is_stable(&self) -> bool {
        self.filter.updates() >= self.params.min_stable_iteration && self.mean_interval().is_some()
    }

    pub fn predict(&self, context: &PredictionContext) -> Vec<PredictedPoint> {
        if !self.is_stable() {
            return Vec::new();
        }
        let Some(estimate) = self.mean_interval().and_then(|dt| self.filter.estimate(dt)) else {
            return Vec::new();
        };

        let initial_confidence = self.confidence.estimate(
            self.filter.updates(),
            estimate.velocity.norm(),
            &self.positions,
        );

        let origin = context.last_state.position;
        let catchup_weight = (1.0
            - context.last_state.velocity.norm() / self.params.min_catchup_velocity)
            .clamp(0.0, 1.0);
        let catchup = (context.target - origin) * catchup_weight;
        let interval = self.params.prediction_interval.as_secs();
        let a_weight = self.params.acceleration_weight;
        let j_weight = self.params.jerk_weight;

        let mut points = Vec::new();
        let mut confidence = initial_confidence;
        while confidence >= MIN_CONFIDENCE && points.len() < self.max_outputs {
            let k = points.len() + 1;
            let dt = k as f64 * interval;
            let position = origin
                + catchup
                + estimate.velocity * dt
                + estimate.acceleration * (a_weight * dt * dt / 2.0)
                + estimate.jerk * (j_weight * dt * dt * dt / 6.0);
            let velocity = estimate.velocity
                + estimate.acceleration * (a_weight * dt)
                + estimate.jerk * (j_weight * dt * dt / 2.0);
            let time = context.last_state.time + Duration(dt);

            points.push(PredictedPoint {
                result: to_result_with(position, velocity, time, context.stylus),
                confidence,
            });
            confidence *= CONFIDENCE_DECAY;
        }

        tracing::trace!(
            points = points.len(),
            confidence = initial_confidence,
            "kalman prediction"
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ConfidenceParams, KalmanParams};
    use crate::stylus_state::StylusState;

    fn params() -> KalmanParams {
        KalmanParams {
            process_noise: 1.0,
            measurement_noise: 1.0,
            min_stable_iteration: 4,
            max_time_samples: 20,
            min_catchup_velocity: 0.02,
            acceleration_weight: 0.5,
            jerk_weight: 0.1,
            prediction_interval: Duration(0.02),
            confidence: ConfidenceParams {
                desired_number_of_samples: 5,
                max_estimation_distance: 1.5,
                min_travel_speed: 1.0,
                max_travel_speed: 1000.0,
                max_linear_deviation: 10.0,
                baseline_linearity_confidence: 0.4,
            },
        }
    }

    fn straight_line(predictor: &mut KalmanPredictor, count: usize) -> TipState {
        let mut last = TipState::at_rest(Vec2::ZERO, Time(0.0));
        for i in 0..count {
            let t = i as f64 * 0.01;
            last = TipState {
                position: Vec2::new(100.0 * t, 0.0),
                velocity: Vec2::new(100.0, 0.0),
                time: Time(t),
            };
            predictor.update(last);
        }
        last
    }

    fn context(last_state: TipState) -> PredictionContext {
        PredictionContext {
            last_state,
            target: last_state.position,
            stylus: StylusState::default(),
        }
    }

    #[test]
    fn test_filter_tracks_constant_velocity() {
        let mut filter = KalmanFilter::new(1.0, 1.0);
        for i in 0..30 {
            filter.update(Vec2::new(i as f64, 2.0 * i as f64));
        }
        let estimate = filter.estimate(Duration(0.01)).unwrap();
        assert!((estimate.position.x - 29.0).abs() < 0.5, "{estimate:?}");
        assert!((estimate.velocity.x - 100.0).abs() < 10.0, "{estimate:?}");
        assert!((estimate.velocity.y - 200.0).abs() < 20.0, "{estimate:?}");
    }

    #[test]
    fn test_unstable_until_min_iterations() {
        let mut predictor = KalmanPredictor::new(params(), 1000);
        let last = straight_line(&mut predictor, 3);
        assert!(!predictor.is_stable());
        assert!(predictor.predict(&context(last)).is_empty());

        let fourth = TipState {
            position: Vec2::new(3.0, 0.0),
            velocity: Vec2::new(100.0, 0.0),
            time: Time(0.03),
        };
        predictor.update(fourth);
        assert_eq!(predictor.updates(), 4);
        assert!(predictor.is_stable());
        assert!(!predictor.predict(&context(fourth)).is_empty());
    }

    #[test]
    fn test_predicts_forward_with_even_spacing() {
        let mut predictor = KalmanPredictor::new(params(), 1000);
        let last = straight_line(&mut predictor, 30);
        let points = predictor.predict(&context(last));

        assert!(!points.is_empty());
        let mut previous_x = last.position.x;
        for (k, point) in points.iter().enumerate() {
            let expected = last.time.as_secs() + (k as f64 + 1.0) * 0.02;
            assert!((point.result.time.as_secs() - expected).abs() < 1e-9);
            assert!(point.result.position.x > previous_x);
            previous_x = point.result.position.x;
        }
        for pair in points.windows(2) {
            assert!(pair[1].confidence <= pair[0].confidence);
        }
        assert!(points.last().unwrap().confidence >= MIN_CONFIDENCE);
    }

    #[test]
    fn test_output_cap() {
        let mut predictor = KalmanPredictor::new(params(), 2);
        let last = straight_line(&mut predictor, 10);
        assert!(predictor.predict(&context(last)).len() <= 2);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut predictor = KalmanPredictor::new(params(), 1000);
        straight_line(&mut predictor, 10);
        predictor.reset();
        assert_eq!(predictor.updates(), 0);
        assert!(!predictor.is_stable());
    }
}
