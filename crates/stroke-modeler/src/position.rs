//! Spring-drag model of the pen tip.
//!
//! The tip is a point mass tied by a spring to a moving anchor (the smoothed
//! input position) and slowed by a drag proportional to its velocity:
//!
//! ```text
//! a = (anchor - p) / spring_mass_constant - drag_constant * v
//! v += h * a
//! p += h * v
//! ```
//!
//! Each call is integrated in equal sub-steps no longer than `max_substep`,
//! so a large gap between inputs cannot blow the integrator up. At most
//! [`MAX_SUBSTEPS`] sub-steps are taken per call; by then the tip has long
//! settled on the anchor and the rest of the gap is skipped.

use inkstroke_model::{Duration, Time, Vec2};

use crate::params::PositionParams;

/// Kinematic state of the pen tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub time: Time,
}

impl TipState {
    pub fn at_rest(position: Vec2, time: Time) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            time,
        }
    }
}

/// Relative slack when deciding how many sub-steps a gap needs, so a gap of
/// exactly one sub-step in floating point does not round up to two.
const SUBSTEP_EPSILON: f64 = 1e-6;

/// Upper bound on sub-steps integrated by a single [`PositionModeler::step`].
pub const MAX_SUBSTEPS: usize = 1 << 16;

#[derive(Debug, Clone)]
pub struct PositionModeler {
    params: PositionParams,
    max_substep: Duration,
    state: TipState,
}

impl PositionModeler {
    pub fn new(params: PositionParams, max_substep: Duration) -> Self {
        Self {
            params,
            max_substep,
            state: TipState::at_rest(Vec2::ZERO, Time(0.0)),
        }
    }

    /// Place the tip at rest on `position`.
    pub fn reset(&mut self, position: Vec2, time: Time) {
        self.state = TipState::at_rest(position, time);
    }

    pub fn state(&self) -> TipState {
        self.state
    }

    /// Restore a state captured earlier with [`PositionModeler::state`].
    pub fn restore(&mut self, state: TipState) {
        self.state = state;
    }

    /// Advance the tip toward `anchor` until `time`.
    pub fn step(&mut self, anchor: Vec2, time: Time) -> TipState {
        let dt = (time - self.state.time).as_secs();
        if dt <= 0.0 {
            return self.state;
        }

        let needed = (dt / self.max_substep.as_secs() - SUBSTEP_EPSILON)
            .ceil()
            .max(1.0);
        let (substeps, h) = if needed <= MAX_SUBSTEPS as f64 {
            (needed as usize, dt / needed)
        } else {
            (MAX_SUBSTEPS, self.max_substep.as_secs())
        };

        let TipState {
            mut position,
            mut velocity,
            ..
        } = self.state;
        for _ in 0..substeps {
            let acceleration = (anchor - position) / self.params.spring_mass_constant
                - velocity * self.params.drag_constant;
            velocity += acceleration * h;
            position += velocity * h;
        }

        self.state = TipState {
            position,
            velocity,
            time,
        };
        self.state
    }
}
