//! Interpolation of pressure, tilt and orientation to output times.

use inkstroke_model::{lerp, normalize01, ModelerInput, Time};

use crate::history::History;

/// Stylus channels at one instant. `None` means the device did not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StylusState {
    pub pressure: Option<f64>,
    pub tilt: Option<f64>,
    pub orientation: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct StylusSample {
    time: Time,
    state: StylusState,
}

/// Keeps the last few raw stylus samples and answers point queries in time.
#[derive(Debug, Clone)]
pub struct StylusStateModeler {
    samples: History<StylusSample>,
}

impl StylusStateModeler {
    pub fn new(max_input_samples: usize) -> Self {
        Self {
            samples: History::new(max_input_samples),
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Record the stylus channels of a raw input. Negative or non-finite
    /// readings are stored as unspecified.
    pub fn record(&mut self, input: &ModelerInput) {
        self.samples.push(StylusSample {
            time: input.time,
            state: StylusState {
                pressure: sanitize(input.pressure),
                tilt: sanitize(input.tilt),
                orientation: sanitize(input.orientation),
            },
        });
    }

    /// Channels at `time`, each interpolated between the recorded samples
    /// that carry it and held constant outside their range.
    pub fn sample_at(&self, time: Time) -> StylusState {
        StylusState {
            pressure: self.channel_at(time, |s| s.pressure),
            tilt: self.channel_at(time, |s| s.tilt),
            orientation: self.channel_at(time, |s| s.orientation),
        }
    }

    fn channel_at(&self, time: Time, channel: impl Fn(&StylusState) -> Option<f64>) -> Option<f64> {
        let mut previous: Option<(Time, f64)> = None;
        for sample in self.samples.iter() {
            let Some(value) = channel(&sample.state) else {
                continue;
            };
            if sample.time >= time {
                return Some(match previous {
                    Some((previous_time, previous_value)) => lerp(
                        previous_value,
                        value,
                        normalize01(previous_time.as_secs(), sample.time.as_secs(), time.as_secs()),
                    ),
                    None => value,
                });
            }
            previous = Some((sample.time, value));
        }
        previous.map(|(_, value)| value)
    }
}

fn sanitize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}
