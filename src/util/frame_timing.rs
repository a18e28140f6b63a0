//! Frame clock for time-driven timelines.

use web_time::Instant;

/// Frame clock that turns wall-clock frames into millisecond deltas for
/// time-driven timelines, with a smoothed FPS readout.
pub struct FrameClock {
    /// Last frame timestamp
    last_frame: Instant,
    /// Upper bound on a single delta (a resumed background tab reports one
    /// huge frame).
    max_delta_ms: f64,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f64,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f64,
}

impl FrameClock {
    /// Create a new frame clock; deltas are capped at `max_delta_ms`.
    #[must_use]
    pub fn new(max_delta_ms: f64) -> Self {
        Self {
            last_frame: Instant::now(),
            max_delta_ms: max_delta_ms.max(0.0),
            smoothed_fps: 60.0, // Start with reasonable default
            smoothing: 0.05,
        }
    }

    /// Call once per frame. Returns the elapsed milliseconds since the
    /// previous call, capped.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;

        let frame_ms = elapsed.as_secs_f64() * 1000.0;
        if frame_ms > 0.0 {
            let instant_fps = 1000.0 / frame_ms;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        frame_ms.min(self.max_delta_ms)
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.smoothed_fps
    }
}
