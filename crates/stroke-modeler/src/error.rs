//! Errors reported by the stroke modeler.

use inkstroke_model::{ModelerResult, Time};

/// Failure of a `reset` or `update` call.
///
/// A failed call never leaves the modeler in a partially-updated state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ModelerError {
    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Wrong input order: {violation}")]
    WrongInputOrder { violation: InputOrderViolation },

    #[error("Non-finite input: {field} is {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    /// The call would have produced more than `limit` results. The results
    /// computed before the limit was hit are carried in `partial`; the
    /// modeler state is left as it was before the call.
    #[error("Update would emit more than {limit} results")]
    TooManyOutputs {
        limit: usize,
        partial: Vec<ModelerResult>,
    },
}

/// How an input broke the `Down, Move*, Up` sequencing.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InputOrderViolation {
    #[error("down received while a stroke is in progress")]
    UnexpectedDown,

    #[error("move received with no stroke in progress")]
    UnexpectedMove,

    #[error("up received with no stroke in progress")]
    UnexpectedUp,

    #[error("time {} does not advance past {}", .current.0, .previous.0)]
    NonIncreasingTime { previous: Time, current: Time },
}

impl ModelerError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: msg.into(),
        }
    }

    pub fn wrong_order(violation: InputOrderViolation) -> Self {
        Self::WrongInputOrder { violation }
    }
}
