//! Frame timing.

use std::time::{Duration, Instant};

/// Longest delta handed to simulation code. Stalls (debugger, window drag)
/// otherwise produce one giant camera jump on resume.
const MAX_DELTA_SECS: f32 = 0.25;

/// Monotonic timer driving the frame loop.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Total time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Seconds since the previous call, clamped to [`MAX_DELTA_SECS`].
    pub fn delta_secs(&mut self) -> f32 {
        let now = Instant::now();
        let delta = (now - self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta.min(MAX_DELTA_SECS)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_non_negative_and_clamped() {
        let mut timer = Timer::new();
        let delta = timer.delta_secs();
        assert!(delta >= 0.0);
        assert!(delta <= MAX_DELTA_SECS);
    }

    #[test]
    fn elapsed_increases_monotonically() {
        let timer = Timer::new();
        let a = timer.elapsed();
        let b = timer.elapsed();
        assert!(b >= a);
    }
}
