use std::time::{Duration, Instant};

/// Monotonic frame timer. Each `tick` returns the seconds elapsed since the
/// previous one, optionally clamped so a stalled frame cannot inject one huge
/// integration step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_delta: Option<Duration>,
}

impl FrameClock {
    pub fn start(max_delta: Option<Duration>) -> Self {
        Self::start_at(Instant::now(), max_delta)
    }

    pub fn start_at(now: Instant, max_delta: Option<Duration>) -> Self {
        Self {
            last: now,
            max_delta,
        }
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let mut elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        if let Some(max) = self.max_delta {
            if elapsed > max {
                tracing::debug!(?elapsed, ?max, "clamping frame delta");
                elapsed = max;
            }
        }
        elapsed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn measures_elapsed_seconds() {
        let t0 = Instant::now();
        let mut clock = FrameClock::start_at(t0, None);
        assert_abs_diff_eq!(clock.tick_at(t0 + Duration::from_millis(16)), 0.016, epsilon = 1e-6);
        assert_abs_diff_eq!(clock.tick_at(t0 + Duration::from_millis(48)), 0.032, epsilon = 1e-6);
    }

    #[test]
    fn unclamped_by_default() {
        let t0 = Instant::now();
        let mut clock = FrameClock::start_at(t0, None);
        assert_abs_diff_eq!(clock.tick_at(t0 + Duration::from_secs(5)), 5.0);
    }

    #[test]
    fn clamps_stalled_frames() {
        let t0 = Instant::now();
        let mut clock = FrameClock::start_at(t0, Some(Duration::from_millis(100)));
        assert_abs_diff_eq!(clock.tick_at(t0 + Duration::from_secs(5)), 0.1, epsilon = 1e-6);
        // Baseline still advances to the real time.
        assert_abs_diff_eq!(
            clock.tick_at(t0 + Duration::from_millis(5_016)),
            0.016,
            epsilon = 1e-6
        );
    }

    #[test]
    fn never_negative() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::start_at(t0, None);
        assert_eq!(clock.tick_at(t0 - Duration::from_millis(10)), 0.0);
    }
}
