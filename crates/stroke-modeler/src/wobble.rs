//! Low-speed jitter suppression.
//!
//! Keeps a duration-weighted moving average of the raw positions seen in the
//! trailing `timeout` window. The output blends from that average (at or
//! below `speed_floor`) to the raw position (at or above `speed_ceiling`),
//! so slow, tremor-dominated motion is smoothed while deliberate fast motion
//! passes through untouched.

use std::collections::VecDeque;

use inkstroke_model::{normalize01, Time, Vec2};

use crate::params::WobbleParams;

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Vec2,
    /// `position * duration`.
    weighted_position: Vec2,
    /// Distance travelled from the previous sample.
    distance: f64,
    /// Time elapsed since the previous sample, seconds.
    duration: f64,
    time: Time,
}

/// Speed-gated moving-average filter on raw positions.
#[derive(Debug, Clone)]
pub struct WobbleSmoother {
    params: WobbleParams,
    samples: VecDeque<Sample>,
}

impl WobbleSmoother {
    pub fn new(params: WobbleParams) -> Self {
        Self {
            params,
            samples: VecDeque::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.params.timeout.as_secs() > 0.0
    }

    /// Start a new stroke at `position`.
    pub fn reset(&mut self, position: Vec2, time: Time) {
        self.samples.clear();
        self.samples.push_back(Sample {
            position,
            weighted_position: Vec2::ZERO,
            distance: 0.0,
            duration: 0.0,
            time,
        });
    }

    /// Feed a raw position and return the smoothed one.
    pub fn smooth(&mut self, position: Vec2, time: Time) -> Vec2 {
        if !self.is_enabled() {
            return position;
        }
        let Some(previous) = self.samples.back().copied() else {
            self.reset(position, time);
            return position;
        };

        let duration = (time - previous.time).as_secs();
        self.samples.push_back(Sample {
            position,
            weighted_position: position * duration,
            distance: position.distance(previous.position),
            duration,
            time,
        });

        let window_start = time - self.params.timeout;
        while self
            .samples
            .front()
            .is_some_and(|sample| sample.time < window_start)
        {
            self.samples.pop_front();
        }

        let mut weighted_sum = Vec2::ZERO;
        let mut distance_sum = 0.0;
        let mut duration_sum = 0.0;
        for sample in &self.samples {
            weighted_sum += sample.weighted_position;
            distance_sum += sample.distance;
            duration_sum += sample.duration;
        }

        if duration_sum < 1e-12 {
            return position;
        }

        let average = weighted_sum / duration_sum;
        let speed = distance_sum / duration_sum;
        Vec2::lerp(
            average,
            position,
            normalize01(self.params.speed_floor, self.params.speed_ceiling, speed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstroke_model::Duration;

    fn smoother() -> WobbleSmoother {
        WobbleSmoother::new(WobbleParams {
            timeout: Duration(0.04),
            speed_floor: 1.31,
            speed_ceiling: 1.44,
        })
    }

    fn assert_near(actual: Vec2, expected: (f64, f64)) {
        assert!(
            (actual.x - expected.0).abs() < 1e-4 && (actual.y - expected.1).abs() < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_slow_line_is_averaged() {
        let mut wobble = smoother();
        wobble.reset(Vec2::new(3.0, 4.0), Time(1.0));

        let steps = [
            ((3.016, 4.0), 1.016, (3.016, 4.0)),
            ((3.032, 4.0), 1.032, (3.024, 4.0)),
            ((3.048, 4.0), 1.048, (3.032, 4.0)),
            ((3.064, 4.0), 1.064, (3.048, 4.0)),
        ];
        for (raw, t, expected) in steps {
            assert_near(wobble.smooth(Vec2::from(raw), Time(t)), expected);
        }
    }

    #[test]
    fn test_slow_zigzag_is_averaged() {
        let mut wobble = smoother();
        wobble.reset(Vec2::new(1.0, 2.0), Time(5.0));

        let steps = [
            ((1.016, 2.0), 5.016, (1.016, 2.0)),
            ((1.016, 2.016), 5.032, (1.016, 2.008)),
            ((1.032, 2.016), 5.048, (1.02133, 2.01067)),
            ((1.032, 2.032), 5.064, (1.0266667, 2.0213333)),
            ((1.048, 2.032), 5.080, (1.0373333, 2.0266667)),
            ((1.048, 2.048), 5.096, (1.0426667, 2.0373333)),
        ];
        for (raw, t, expected) in steps {
            assert_near(wobble.smooth(Vec2::from(raw), Time(t)), expected);
        }
    }

    #[test]
    fn test_fast_motion_passes_through() {
        let mut wobble = smoother();
        wobble.reset(Vec2::new(0.0, 0.0), Time(0.0));
        for i in 1..=5 {
            let raw = Vec2::new(i as f64 * 0.1, 0.0);
            let smoothed = wobble.smooth(raw, Time(i as f64 * 0.01));
            assert_near(smoothed, (raw.x, raw.y));
        }
    }

    #[test]
    fn test_disabled_returns_raw() {
        let mut wobble = WobbleSmoother::new(WobbleParams {
            timeout: Duration(0.0),
            speed_floor: 1.31,
            speed_ceiling: 1.44,
        });
        assert!(!wobble.is_enabled());
        wobble.reset(Vec2::new(1.0, 2.0), Time(0.0));
        let raw = Vec2::new(1.001, 2.0);
        assert_eq!(wobble.smooth(raw, Time(0.01)), raw);
    }
}
