//! Confidence in a Kalman prediction.
//!
//! The estimate is the product of three factors in `[0, 1]`: enough samples
//! seen, a plausible travel speed, and a recent path that is close to a
//! straight line.

use inkstroke_model::Vec2;

use crate::history::History;
use crate::params::ConfidenceParams;

#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    params: ConfidenceParams,
}

impl ConfidenceEstimator {
    pub fn new(params: ConfidenceParams) -> Self {
        Self { params }
    }

    /// Confidence for the first predicted point.
    pub fn estimate(&self, updates: usize, speed: f64, positions: &History<Vec2>) -> f64 {
        let confidence = self.sample_factor(updates)
            * self.speed_factor(speed)
            * self.linearity_factor(positions);
        confidence.clamp(0.0, 1.0)
    }

    pub fn sample_factor(&self, updates: usize) -> f64 {
        (updates as f64 / self.params.desired_number_of_samples as f64).min(1.0)
    }

    /// 1 inside `[min_travel_speed, max_travel_speed]`, falling off in
    /// proportion outside it.
    pub fn speed_factor(&self, speed: f64) -> f64 {
        let ConfidenceParams {
            min_travel_speed,
            max_travel_speed,
            ..
        } = self.params;
        if !speed.is_finite() {
            0.0
        } else if speed < min_travel_speed {
            speed / min_travel_speed
        } else if speed > max_travel_speed {
            max_travel_speed / speed
        } else {
            1.0
        }
    }

    pub fn linearity_factor(&self, positions: &History<Vec2>) -> f64 {
        let deviation = self.linear_deviation(positions);
        let normalized = (deviation / self.params.max_linear_deviation).min(1.0);
        1.0 - (1.0 - self.params.baseline_linearity_confidence) * normalized
    }

    /// Largest distance of the recent positions from their best-fit line.
    ///
    /// Only positions within `max_estimation_distance` of the newest one
    /// are considered, walking back until the first one that is not.
    pub fn linear_deviation(&self, positions: &History<Vec2>) -> f64 {
        let Some(&newest) = positions.newest() else {
            return 0.0;
        };
        let recent: Vec<Vec2> = positions
            .iter()
            .rev()
            .take_while(|p| p.distance(newest) <= self.params.max_estimation_distance)
            .copied()
            .collect();
        if recent.len() < 3 {
            return 0.0;
        }

        let centroid = recent.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / recent.len() as f64;
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for p in &recent {
            let d = *p - centroid;
            sxx += d.x * d.x;
            sxy += d.x * d.y;
            syy += d.y * d.y;
        }
        // Principal axis of the scatter; the line minimizing perpendicular
        // distances runs through the centroid along it.
        let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        let normal = Vec2::new(-angle.sin(), angle.cos());

        recent
            .iter()
            .map(|p| (*p - centroid).dot(normal).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ConfidenceEstimator {
        ConfidenceEstimator::new(ConfidenceParams {
            desired_number_of_samples: 10,
            max_estimation_distance: 5.0,
            min_travel_speed: 1.0,
            max_travel_speed: 5.0,
            max_linear_deviation: 1.0,
            baseline_linearity_confidence: 0.4,
        })
    }

    fn history(points: &[(f64, f64)]) -> History<Vec2> {
        let mut history = History::new(20);
        for &p in points {
            history.push(Vec2::from(p));
        }
        history
    }

    #[test]
    fn test_sample_factor() {
        let estimator = estimator();
        assert_eq!(estimator.sample_factor(0), 0.0);
        assert_eq!(estimator.sample_factor(5), 0.5);
        assert_eq!(estimator.sample_factor(40), 1.0);
    }

    #[test]
    fn test_speed_factor() {
        let estimator = estimator();
        assert_eq!(estimator.speed_factor(0.5), 0.5);
        assert_eq!(estimator.speed_factor(3.0), 1.0);
        assert_eq!(estimator.speed_factor(10.0), 0.5);
        assert_eq!(estimator.speed_factor(f64::NAN), 0.0);
    }

    #[test]
    fn test_straight_path_has_no_deviation() {
        let estimator = estimator();
        let line = history(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert!(estimator.linear_deviation(&line) < 1e-12);
        assert!((estimator.linearity_factor(&line) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bent_path_reduces_confidence() {
        let estimator = estimator();
        // Symmetric about y = 1/3 after fitting a horizontal line.
        let bent = history(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let deviation = estimator.linear_deviation(&bent);
        assert!((deviation - 2.0 / 3.0).abs() < 1e-9, "{deviation}");
        let factor = estimator.linearity_factor(&bent);
        assert!((factor - (1.0 - 0.6 * 2.0 / 3.0)).abs() < 1e-9);

        let wild = history(&[(0.0, 0.0), (1.0, 4.0), (2.0, 0.0)]);
        assert!((estimator.linearity_factor(&wild) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_far_positions_are_ignored() {
        let estimator = estimator();
        // The first point is more than 5 units from the newest.
        let positions = history(&[(0.0, 50.0), (10.0, 0.0), (11.0, 0.0), (12.0, 0.0)]);
        assert!(estimator.linear_deviation(&positions) < 1e-12);
    }

    #[test]
    fn test_estimate_is_product() {
        let estimator = estimator();
        let line = history(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let confidence = estimator.estimate(5, 10.0, &line);
        assert!((confidence - 0.25).abs() < 1e-12);
    }
}
