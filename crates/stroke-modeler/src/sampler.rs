//! Output cadence and end-of-stroke convergence.
//!
//! Between two inputs the anchor is moved along the straight line joining
//! them in at least `gap * min_output_rate` equal steps, so sparse input
//! still yields dense output. At the end of the stroke the tip is pulled
//! toward the final raw position in a bounded loop that halves its step
//! whenever a step would not bring the tip strictly closer to the target.

use inkstroke_model::{nearest_point_on_segment, Duration, ModelerResult, Time, Vec2};

use crate::params::SamplingParams;
use crate::position::{PositionModeler, TipState};
use crate::stylus_state::{StylusState, StylusStateModeler};

/// Tolerance when converting a time gap into a step count, so a gap that
/// is an exact multiple of the output period does not gain an extra step.
const STEP_COUNT_EPSILON: f64 = 1e-9;

/// Marker returned once an [`OutputBuffer`] is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimitReached;

/// Results of one `update` call, capped at a fixed count.
#[derive(Debug)]
pub struct OutputBuffer {
    results: Vec<ModelerResult>,
    limit: usize,
}

impl OutputBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            results: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, result: ModelerResult) -> Result<(), OutputLimitReached> {
        if self.results.len() >= self.limit {
            return Err(OutputLimitReached);
        }
        self.results.push(result);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// How many more results fit.
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.results.len())
    }

    pub fn into_results(self) -> Vec<ModelerResult> {
        self.results
    }
}

/// Outcome of the end-of-stroke loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfStroke {
    /// Candidate steps attempted, accepted or not.
    pub iterations: usize,
    /// Whether the tip ended within the stopping distance.
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct AdaptiveSampler {
    params: SamplingParams,
}

impl AdaptiveSampler {
    pub fn new(params: SamplingParams) -> Self {
        Self { params }
    }

    /// The longest time between two outputs.
    pub fn output_period(&self) -> Duration {
        Duration::from_rate(self.params.min_output_rate)
    }

    /// Number of steps needed to cover `gap` at the minimum output rate.
    pub fn steps_for(&self, gap: Duration) -> usize {
        let steps = (gap.as_secs() * self.params.min_output_rate - STEP_COUNT_EPSILON).ceil();
        if steps.is_nan() || steps < 1.0 {
            1
        } else {
            // Saturating; `sample_path` refuses counts the buffer cannot hold.
            steps as usize
        }
    }

    /// Drive the tip along the line from `start` to `end`, emitting one
    /// result per step. The last result is stamped exactly `end.1`.
    ///
    /// A path needing more steps than `out` can still take is refused
    /// before the tip moves.
    pub fn sample_path(
        &self,
        tip: &mut PositionModeler,
        stylus: &StylusStateModeler,
        start: (Vec2, Time),
        end: (Vec2, Time),
        out: &mut OutputBuffer,
    ) -> Result<(), OutputLimitReached> {
        let (start_anchor, start_time) = start;
        let (end_anchor, end_time) = end;
        let steps = self.steps_for(end_time - start_time);
        if steps > out.remaining() {
            return Err(OutputLimitReached);
        }

        for i in 1..=steps {
            let fraction = i as f64 / steps as f64;
            let time = if i == steps {
                end_time
            } else {
                start_time + (end_time - start_time) * fraction
            };
            let state = tip.step(Vec2::lerp(start_anchor, end_anchor, fraction), time);
            out.push(to_result(state, stylus))?;
        }
        Ok(())
    }

    /// Pull the tip toward `target` until it is within the stopping distance
    /// or the iteration cap is spent.
    ///
    /// Every accepted step ends strictly closer to `target` than the one
    /// before it. A step that overshoots, stalls or moves away is discarded
    /// and retried with half the time step.
    pub fn end_of_stroke(
        &self,
        tip: &mut PositionModeler,
        stylus: &StylusStateModeler,
        target: Vec2,
        out: &mut OutputBuffer,
    ) -> Result<EndOfStroke, OutputLimitReached> {
        let stop_distance = self.params.end_of_stroke_stopping_distance;
        let mut outcome = EndOfStroke {
            iterations: 0,
            converged: tip.state().position.distance(target) <= stop_distance,
        };
        let mut dt = self.output_period();

        while !outcome.converged && outcome.iterations < self.params.end_of_stroke_max_iterations
        {
            outcome.iterations += 1;

            let previous = tip.state();
            let next_time = previous.time + dt;
            if next_time <= previous.time {
                // dt underflowed: no further step can be taken, so the
                // remaining iterations are spent without moving the tip.
                continue;
            }

            let candidate = tip.step(target, next_time);
            let along = nearest_point_on_segment(previous.position, candidate.position, target);
            let remaining = candidate.position.distance(target);
            if along < 1.0 || remaining >= previous.position.distance(target) {
                tracing::trace!(
                    iteration = outcome.iterations,
                    dt = dt.as_secs(),
                    "end-of-stroke step rejected, halving"
                );
                tip.restore(previous);
                dt = dt * 0.5;
                continue;
            }

            out.push(to_result(candidate, stylus))?;
            outcome.converged = remaining <= stop_distance;
            tracing::trace!(
                iteration = outcome.iterations,
                remaining,
                "end-of-stroke step accepted"
            );
        }

        Ok(outcome)
    }
}

pub(crate) fn to_result(state: TipState, stylus: &StylusStateModeler) -> ModelerResult {
    to_result_with(
        state.position,
        state.velocity,
        state.time,
        stylus.sample_at(state.time),
    )
}

pub(crate) fn to_result_with(
    position: Vec2,
    velocity: Vec2,
    time: Time,
    channels: StylusState,
) -> ModelerResult {
    ModelerResult {
        position,
        velocity,
        time,
        pressure: channels.pressure,
        tilt: channels.tilt,
        orientation: channels.orientation,
    }
}
