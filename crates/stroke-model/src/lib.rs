//! Inkstroke Model
//!
//! Defines the data contracts shared by the stroke modeler and its callers:
//! - **Geometry:** `Vec2` and the small interpolation helpers built on it
//! - **Time:** monotonic `Time` stamps and `Duration`s, in seconds
//! - **Input:** raw stylus samples (`Down`/`Move`/`Up`) with optional stylus state
//! - **Result:** modeled stroke points with velocity
//! - **Config:** the nested, serde-friendly stroke model configuration
//!
//! Optional stylus channels use `None` as the "unspecified" value; they are
//! never defaulted to a number.

pub mod config;
pub mod geometry;
pub mod input;
pub mod result;
pub mod time;

pub use config::*;
pub use geometry::*;
pub use input::*;
pub use result::*;
pub use time::*;
