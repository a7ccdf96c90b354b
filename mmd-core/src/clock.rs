mod clock_calibrator;
mod playback_clock;

pub use clock_calibrator::*;
pub use playback_clock::*;

use std::time::Instant;

/// A time source that reports coarse, possibly stale positions, such as an audio element.
pub trait CoarseClock {
    /// Current position in seconds.
    fn current_time(&self) -> f64;
    fn playback_rate(&self) -> f64;
}

/// A high resolution monotonic time source.
pub trait WallClock {
    /// Seconds since an arbitrary fixed origin.
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for InstantClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
