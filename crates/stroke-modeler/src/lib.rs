//! Inkstroke Modeler
//!
//! Turns raw stylus samples into a smooth, evenly-sampled stroke:
//! - **Wobble smoothing:** speed-gated moving average that removes tremor
//! - **Position modeling:** spring-drag simulation of the pen tip
//! - **Adaptive sampling:** minimum output rate and bounded end-of-stroke catch-up
//! - **Stylus state:** pressure/tilt/orientation interpolated to output times
//! - **Prediction:** optional Kalman extrapolation gated by a confidence model
//!
//! This crate is pure computation: no I/O, no threads, no global state.
//! All inputs are data; all outputs are data.

pub mod error;
pub mod history;
pub mod modeler;
pub mod params;
pub mod position;
pub mod predictor;
pub mod sampler;
pub mod stylus_state;
pub mod wobble;

pub use error::{InputOrderViolation, ModelerError};
pub use modeler::{ModelerState, StrokeModeler};
pub use params::ModelerParams;
pub use predictor::{PredictedPoint, Predictor};
