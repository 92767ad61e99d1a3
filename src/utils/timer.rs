use std::time::{Duration, Instant};

const FPS_SAMPLES: usize = 256;
const TITLE_INTERVAL: Duration = Duration::from_millis(500);

/// Rolling average of the instantaneous frame rate over the last 256 frames.
pub struct FrameTimer {
    samples: [f64; FPS_SAMPLES],
    cursor: usize,
    last_frame: Instant,
    last_report: Instant,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        FrameTimer {
            samples: [0.0; FPS_SAMPLES],
            cursor: 0,
            last_frame: now,
            last_report: now,
        }
    }

    /// Mark the end of a frame and return its duration in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;
        if !dt.is_zero() {
            self.push(1.0 / dt.as_secs_f64());
        }
        dt.as_secs_f32()
    }

    pub fn push(&mut self, fps: f64) {
        self.samples[self.cursor] = fps;
        self.cursor = (self.cursor + 1) % FPS_SAMPLES;
    }

    /// Mean over the whole window; unfilled slots count as zero.
    pub fn average_fps(&self) -> f64 {
        self.samples.iter().sum::<f64>() / FPS_SAMPLES as f64
    }

    /// True at most twice a second, when the title should be refreshed.
    pub fn should_report(&mut self) -> bool {
        if self.last_report.elapsed() >= TITLE_INTERVAL {
            self.last_report = Instant::now();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_wraps_after_the_window() {
        let mut timer = FrameTimer::new();
        for _ in 0..FPS_SAMPLES {
            timer.push(30.0);
        }
        assert_eq!(timer.average_fps(), 30.0);
        for _ in 0..FPS_SAMPLES {
            timer.push(60.0);
        }
        assert_eq!(timer.average_fps(), 60.0);
    }

    #[test]
    fn partial_window_counts_empty_slots() {
        let mut timer = FrameTimer::new();
        timer.push(256.0);
        assert_eq!(timer.average_fps(), 1.0);
    }
}
