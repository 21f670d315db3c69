//! Forward prediction of the stroke for latency hiding.

pub mod confidence;
pub mod kalman;

use inkstroke_model::{ModelerResult, Vec2};

use crate::params::{ModelerParams, PredictionParams};
use crate::position::TipState;
use crate::stylus_state::StylusState;

pub use confidence::ConfidenceEstimator;
pub use kalman::{KalmanEstimate, KalmanFilter, KalmanPredictor};

/// A predicted point and the predictor's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedPoint {
    pub result: ModelerResult,
    /// In `[0, 1]`; non-increasing along one prediction.
    pub confidence: f64,
}

/// What the predictor needs to know about the stroke so far.
#[derive(Debug, Clone, Copy)]
pub struct PredictionContext {
    /// Last modeled tip state.
    pub last_state: TipState,
    /// Latest smoothed input position the tip is chasing.
    pub target: Vec2,
    /// Stylus channels to attach to every predicted point.
    pub stylus: StylusState,
}

/// The active predictor.
#[derive(Debug, Clone)]
pub enum Predictor {
    /// Prediction disabled.
    StrokeEnd,
    Kalman(KalmanPredictor),
}

impl Predictor {
    pub fn new(params: &ModelerParams) -> Self {
        match params.prediction {
            PredictionParams::StrokeEnd => Self::StrokeEnd,
            PredictionParams::Kalman(kalman) => Self::Kalman(KalmanPredictor::new(
                kalman,
                params.sampling.max_outputs_per_call,
            )),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::StrokeEnd => {}
            Self::Kalman(kalman) => kalman.reset(),
        }
    }

    /// Feed the last modeled state of an accepted update.
    pub fn update(&mut self, state: TipState) {
        match self {
            Self::StrokeEnd => {}
            Self::Kalman(kalman) => kalman.update(state),
        }
    }

    pub fn predict(&self, context: &PredictionContext) -> Vec<PredictedPoint> {
        match self {
            Self::StrokeEnd => Vec::new(),
            Self::Kalman(kalman) => kalman.predict(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstroke_model::Time;

    #[test]
    fn test_stroke_end_never_predicts() {
        let mut predictor = Predictor::new(&ModelerParams::default());
        assert!(matches!(predictor, Predictor::StrokeEnd));

        let state = TipState::at_rest(Vec2::new(1.0, 1.0), Time(0.0));
        for i in 0..10 {
            predictor.update(TipState {
                time: Time(i as f64 * 0.01),
                ..state
            });
        }
        let context = PredictionContext {
            last_state: state,
            target: state.position,
            stylus: StylusState::default(),
        };
        assert!(predictor.predict(&context).is_empty());
    }
}
