// Frame timing: per-frame delta and a once-per-second FPS readout.

use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Wall-clock frame timer owned by the application loop.
pub struct FrameClock {
    last_frame: Instant,
    window_start: Instant,
    frames_in_window: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            window_start: now,
            frames_in_window: 0,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Frames per second, reported once per elapsed second.
    pub fn fps(&mut self) -> Option<f32> {
        self.fps_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frames_in_window += 1;
        delta
    }

    fn fps_at(&mut self, now: Instant) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return None;
        }

        let fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames_in_window = 0;
        Some(fps)
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
    use approx::assert_relative_eq;

    #[test]
    fn tick_reports_elapsed_seconds() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;

        let delta = clock.tick_at(start + Duration::from_millis(16));
        assert_relative_eq!(delta, 0.016, epsilon = 1e-6);

        let delta = clock.tick_at(start + Duration::from_millis(48));
        assert_relative_eq!(delta, 0.032, epsilon = 1e-6);
    }

    #[test]
    fn fps_stays_quiet_inside_the_window() {
        let mut clock = FrameClock::new();
        let start = clock.window_start;

        clock.tick_at(start + Duration::from_millis(100));
        assert_eq!(clock.fps_at(start + Duration::from_millis(100)), None);
    }

    #[test]
    fn fps_averages_frames_over_the_window() {
        let mut clock = FrameClock::new();
        let start = clock.window_start;

        for i in 1..=60 {
            clock.tick_at(start + Duration::from_millis(i * 16));
        }

        let fps = clock.fps_at(start + Duration::from_secs(1)).unwrap();
        assert_relative_eq!(fps, 60.0, epsilon = 1e-3);

        // The window resets after a report.
        assert_eq!(clock.fps_at(start + Duration::from_millis(1500)), None);
    }
}
