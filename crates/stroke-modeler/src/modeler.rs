//! The stroke modeler state machine.
//!
//! `Idle --Down--> InProgress --Move*--> InProgress --Up--> Idle`
//!
//! Every `update` runs against a copy of the stroke session that is only
//! committed when the call succeeds, so a rejected or overflowing input
//! leaves the modeler exactly as it was.

use inkstroke_model::{InputEventType, ModelerInput, ModelerResult, StrokeModelConfig, Time, Vec2};

use crate::error::{InputOrderViolation, ModelerError};
use crate::params::ModelerParams;
use crate::position::PositionModeler;
use crate::predictor::{PredictedPoint, PredictionContext, Predictor};
use crate::sampler::{to_result, AdaptiveSampler, OutputBuffer, OutputLimitReached};
use crate::stylus_state::StylusStateModeler;
use crate::wobble::WobbleSmoother;

/// Whether a stroke is being modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelerState {
    Idle,
    InProgress,
}

/// Where the current stroke left off.
#[derive(Debug, Clone, Copy)]
struct StrokeProgress {
    last_time: Time,
    /// Smoothed position of the last input.
    last_target: Vec2,
}

/// Everything that is reset between strokes.
#[derive(Debug, Clone)]
struct Session {
    wobble: WobbleSmoother,
    tip: PositionModeler,
    stylus: StylusStateModeler,
    predictor: Predictor,
    stroke: Option<StrokeProgress>,
}

impl Session {
    fn new(params: &ModelerParams, sampler: &AdaptiveSampler) -> Self {
        Self {
            wobble: WobbleSmoother::new(params.wobble),
            tip: PositionModeler::new(params.position, sampler.output_period()),
            stylus: StylusStateModeler::new(params.stylus_state.max_input_samples),
            predictor: Predictor::new(params),
            stroke: None,
        }
    }

    fn begin(
        &mut self,
        input: &ModelerInput,
        out: &mut OutputBuffer,
    ) -> Result<(), OutputLimitReached> {
        self.wobble.reset(input.position, input.time);
        self.tip.reset(input.position, input.time);
        self.stylus.reset();
        self.stylus.record(input);
        self.predictor.reset();

        let state = self.tip.state();
        out.push(to_result(state, &self.stylus))?;
        self.predictor.update(state);
        self.stroke = Some(StrokeProgress {
            last_time: input.time,
            last_target: input.position,
        });
        Ok(())
    }

    fn advance(
        &mut self,
        input: &ModelerInput,
        progress: StrokeProgress,
        sampler: &AdaptiveSampler,
        out: &mut OutputBuffer,
    ) -> Result<(), OutputLimitReached> {
        self.stylus.record(input);
        let target = self.wobble.smooth(input.position, input.time);
        sampler.sample_path(
            &mut self.tip,
            &self.stylus,
            (progress.last_target, progress.last_time),
            (target, input.time),
            out,
        )?;

        match input.event_type {
            InputEventType::Up => {
                let outcome =
                    sampler.end_of_stroke(&mut self.tip, &self.stylus, input.position, out)?;
                tracing::debug!(
                    iterations = outcome.iterations,
                    converged = outcome.converged,
                    "stroke ended"
                );
                self.predictor.reset();
                self.stroke = None;
            }
            _ => {
                self.predictor.update(self.tip.state());
                self.stroke = Some(StrokeProgress {
                    last_time: input.time,
                    last_target: target,
                });
            }
        }
        Ok(())
    }
}

/// Turns raw stylus input into smoothed, resampled stroke points.
///
/// One instance models one stroke at a time; use separate instances for
/// simultaneous strokes.
#[derive(Debug, Clone)]
pub struct StrokeModeler {
    params: ModelerParams,
    sampler: AdaptiveSampler,
    session: Session,
}

impl Default for StrokeModeler {
    fn default() -> Self {
        Self::with_params(ModelerParams::default())
    }
}

impl StrokeModeler {
    /// Create a modeler from `config`, validating it.
    pub fn new(config: &StrokeModelConfig) -> Result<Self, ModelerError> {
        Ok(Self::with_params(ModelerParams::resolve(config)?))
    }

    pub fn with_params(params: ModelerParams) -> Self {
        let sampler = AdaptiveSampler::new(params.sampling);
        let session = Session::new(&params, &sampler);
        Self {
            params,
            sampler,
            session,
        }
    }

    pub fn params(&self) -> &ModelerParams {
        &self.params
    }

    pub fn state(&self) -> ModelerState {
        if self.session.stroke.is_some() {
            ModelerState::InProgress
        } else {
            ModelerState::Idle
        }
    }

    /// Abandon any stroke in progress. With `Some(config)` the modeler is
    /// also reconfigured; an invalid config is rejected and nothing changes.
    pub fn reset(&mut self, config: Option<&StrokeModelConfig>) -> Result<(), ModelerError> {
        if let Some(config) = config {
            let params = ModelerParams::resolve(config)?;
            self.sampler = AdaptiveSampler::new(params.sampling);
            self.params = params;
        }
        self.session = Session::new(&self.params, &self.sampler);
        tracing::debug!(prediction = ?self.params.prediction, "stroke modeler reset");
        Ok(())
    }

    /// Process one raw input and return the stroke points it produces.
    pub fn update(&mut self, input: &ModelerInput) -> Result<Vec<ModelerResult>, ModelerError> {
        if let Err(err) = self.check_input(input) {
            tracing::warn!(
                event = ?input.event_type,
                time = input.time.as_secs(),
                error = %err,
                "rejected stroke input"
            );
            return Err(err);
        }

        let mut session = self.session.clone();
        let mut out = OutputBuffer::new(self.params.sampling.max_outputs_per_call);
        let outcome = match session.stroke {
            None => {
                tracing::debug!(x = input.position.x, y = input.position.y, "stroke started");
                session.begin(input, &mut out)
            }
            Some(progress) => session.advance(input, progress, &self.sampler, &mut out),
        };

        match outcome {
            Ok(()) => {
                self.session = session;
                Ok(out.into_results())
            }
            Err(OutputLimitReached) => {
                tracing::warn!(
                    limit = out.limit(),
                    event = ?input.event_type,
                    "update exceeded the output limit; state rolled back"
                );
                Err(ModelerError::TooManyOutputs {
                    limit: out.limit(),
                    partial: out.into_results(),
                })
            }
        }
    }

    /// Predicted continuation of the current stroke. Empty when idle or
    /// when prediction is disabled.
    pub fn predict(&self) -> Vec<ModelerResult> {
        self.predict_with_confidence()
            .into_iter()
            .map(|point| point.result)
            .collect()
    }

    /// Like [`StrokeModeler::predict`], with the confidence of each point.
    pub fn predict_with_confidence(&self) -> Vec<PredictedPoint> {
        let Some(progress) = self.session.stroke else {
            return Vec::new();
        };
        let context = PredictionContext {
            last_state: self.session.tip.state(),
            target: progress.last_target,
            stylus: self.session.stylus.sample_at(progress.last_time),
        };
        self.session.predictor.predict(&context)
    }

    fn check_input(&self, input: &ModelerInput) -> Result<(), ModelerError> {
        for (field, value) in [
            ("x", input.position.x),
            ("y", input.position.y),
            ("time", input.time.as_secs()),
        ] {
            if !value.is_finite() {
                return Err(ModelerError::NonFiniteInput { field, value });
            }
        }

        let violation = match (self.session.stroke, input.event_type) {
            (None, InputEventType::Down) => None,
            (None, InputEventType::Move) => Some(InputOrderViolation::UnexpectedMove),
            (None, InputEventType::Up) => Some(InputOrderViolation::UnexpectedUp),
            (Some(_), InputEventType::Down) => Some(InputOrderViolation::UnexpectedDown),
            (Some(progress), _) if input.time <= progress.last_time => {
                Some(InputOrderViolation::NonIncreasingTime {
                    previous: progress.last_time,
                    current: input.time,
                })
            }
            (Some(_), _) => None,
        };
        match violation {
            Some(violation) => Err(ModelerError::wrong_order(violation)),
            None => Ok(()),
        }
    }
}
