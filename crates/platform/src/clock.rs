use std::time::{Duration, Instant};

/// Longest frame step fed to animations; longer stalls are treated as this.
pub const MAX_FRAME_STEP: f32 = 0.1;

/// Elapsed time since start plus a clamped per-frame delta and a smoothed
/// frames-per-second estimate.
pub struct FrameClock {
    start: Instant,
    last: Instant,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            fps: 0.0,
        }
    }

    /// Returns `(elapsed_seconds, dt_seconds)`.
    pub fn tick(&mut self) -> (f32, f32) {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> (f32, f32) {
        let raw = now.saturating_duration_since(self.last);
        self.last = now;
        if raw > Duration::ZERO {
            let instant_fps = 1.0 / raw.as_secs_f32();
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps * 0.9 + instant_fps * 0.1
            };
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        (elapsed, raw.as_secs_f32().min(MAX_FRAME_STEP))
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FrameClock::new();
        let later = clock.start + Duration::from_secs(3);
        let (elapsed, dt) = clock.tick_at(later);
        assert!((elapsed - 3.0).abs() < 1e-4);
        assert_eq!(dt, MAX_FRAME_STEP);
    }

    #[test]
    fn fps_tracks_frame_rate() {
        let mut clock = FrameClock::new();
        let mut t = clock.start;
        for _ in 0..100 {
            t += Duration::from_millis(20);
            clock.tick_at(t);
        }
        assert!((clock.fps() - 50.0).abs() < 0.5, "fps = {}", clock.fps());
    }
}
