//! Time-driven helpers around the reducer: the hover throttle and the camera animation.
//!
//! Neither reads a clock. Callers pass `now` in, which keeps both deterministic under test.

use std::time::{Duration, Instant};

use crate::geometry::Transform;

/// Lets an event through at most once per `interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether an event at `now` may run; a `true` answer starts a new interval
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Let the next event through regardless of timing
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(30))
    }
}

/// Quadratic ease-in-out on `[0, 1]`
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Camera interpolation from one transform to another.
///
/// The host calls [`CameraAnimation::step`] once per frame and schedules another frame
/// while it reports unfinished. Dropping the animation cancels it.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraAnimation {
    pub from: Transform,
    pub to: Transform,
    started: Instant,
    duration: Duration,
}

impl CameraAnimation {
    pub fn new(from: Transform, to: Transform, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Transform for the frame at `now` and whether the animation is done.
    /// The final frame lands exactly on `to`.
    pub fn step(&self, now: Instant) -> (Transform, bool) {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return (self.to, true);
        }
        (self.from.lerp(&self.to, ease_in_out(progress)), false)
    }
}

#[cfg(test)]
mod tests {
    use canvas_common::Vec2;

    use super::*;

    #[test]
    fn test_throttle_gates_bursts() {
        let mut throttle = Throttle::new(Duration::from_millis(30));
        let start = Instant::now();

        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(10)));
        assert!(!throttle.ready(start + Duration::from_millis(29)));
        assert!(throttle.ready(start + Duration::from_millis(30)));
        assert!(!throttle.ready(start + Duration::from_millis(40)));

        throttle.reset();
        assert!(throttle.ready(start + Duration::from_millis(41)));
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!(ease_in_out(0.25) < 0.25);
        assert!(ease_in_out(0.75) > 0.75);
    }

    #[test]
    fn test_animation_reaches_target() {
        let start = Instant::now();
        let to = Transform::new(Vec2::new(100.0, -50.0), 2.0);
        let animation = CameraAnimation::new(Transform::IDENTITY, to, start, Duration::from_millis(200));

        let (first, done) = animation.step(start);
        assert_eq!(first, Transform::IDENTITY);
        assert!(!done);

        let (mid, done) = animation.step(start + Duration::from_millis(100));
        assert!(!done);
        assert_eq!(mid.zoom, 1.5);
        assert_eq!(mid.pan, Vec2::new(50.0, -25.0));

        let (last, done) = animation.step(start + Duration::from_millis(500));
        assert!(done);
        assert_eq!(last, to);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let start = Instant::now();
        let to = Transform::new(Vec2::new(10.0, 10.0), 3.0);
        let animation = CameraAnimation::new(Transform::IDENTITY, to, start, Duration::ZERO);
        assert_eq!(animation.step(start), (to, true));
    }
}
