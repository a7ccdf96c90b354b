use super::CoarseClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// The authoritative playback position of a sequence.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    current_time: f64,
    playback_rate: f64,
}

impl PlaybackClock {
    pub fn new(playback_rate: f64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_time: 0.0,
            playback_rate: playback_rate.max(0.0),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    /// Negative rates are clamped to `0`.
    pub fn set_playback_rate(&mut self, playback_rate: f64) {
        self.playback_rate = playback_rate.max(0.0);
    }

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
    }

    pub fn seek(&mut self, time: f64) {
        self.current_time = time.max(0.0);
    }

    /// Advances by `delta` wall seconds scaled by the playback rate. No-op unless playing.
    pub fn advance(&mut self, delta: f64) {
        if self.is_playing() && 0.0 < delta {
            self.current_time += delta * self.playback_rate;
        }
    }

    /// Moves forward to an externally calibrated time. Never moves backward. No-op unless playing.
    pub fn sync_to(&mut self, time: f64) {
        if self.is_playing() && self.current_time < time {
            self.current_time = time;
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CoarseClock for PlaybackClock {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn playback_rate(&self) -> f64 {
        if self.is_playing() {
            self.playback_rate
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_clock_states() {
        let mut clock = PlaybackClock::new(-2.0);
        assert_eq!(clock.playback_rate(), 0.0);
        clock.set_playback_rate(2.0);

        clock.advance(1.0);
        assert_eq!(clock.current_time(), 0.0);

        clock.play();
        clock.advance(0.5);
        assert_eq!(clock.current_time(), 1.0);

        clock.pause();
        assert_eq!(clock.state(), PlaybackState::Paused);
        clock.advance(0.5);
        clock.sync_to(10.0);
        assert_eq!(clock.current_time(), 1.0);

        clock.play();
        clock.sync_to(0.5);
        assert_eq!(clock.current_time(), 1.0);

        clock.stop();
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.current_time(), 0.0);
    }
}
