use super::{CoarseClock, InstantClock, WallClock};
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Turns a coarse clock into a continuous, non-decreasing one by extrapolating with a wall clock.
pub struct ClockCalibrator {
    source: Box<dyn CoarseClock>,
    wall_clock: Box<dyn WallClock>,
    base_time: f64,
    base_wall_time: f64,
    last_raw_time: Option<f64>,
    last_output: Option<f64>,
    /// Added to every reading so the output can be moved independently of the source.
    offset: f64,
}

impl ClockCalibrator {
    /// Extrapolation beyond this many seconds past the last observed value is not trusted.
    pub const MAX_EXTRAPOLATION: f64 = 0.5;

    pub fn new(source: Box<dyn CoarseClock>) -> Self {
        Self::with_wall_clock(source, Box::new(InstantClock::new()))
    }

    pub fn with_wall_clock(source: Box<dyn CoarseClock>, wall_clock: Box<dyn WallClock>) -> Self {
        Self {
            source,
            wall_clock,
            base_time: 0.0,
            base_wall_time: 0.0,
            last_raw_time: None,
            last_output: None,
            offset: 0.0,
        }
    }

    pub fn source(&self) -> &dyn CoarseClock {
        self.source.as_ref()
    }

    pub fn calibrated_time(&mut self) -> f64 {
        self.source_time() + self.offset
    }

    fn source_time(&mut self) -> f64 {
        let raw_time = self.source.current_time();
        let now = self.wall_clock.now();

        let output = match (self.last_raw_time, self.last_output) {
            (Some(last_raw_time), Some(last_output)) if last_raw_time == raw_time => {
                let extrapolated =
                    (now - self.base_wall_time).max(0.0) * self.source.playback_rate();

                if Self::MAX_EXTRAPOLATION < extrapolated {
                    return last_output;
                }

                (self.base_time + extrapolated).max(last_output)
            }
            (_, last_output) => {
                self.last_raw_time = Some(raw_time);
                self.base_time = raw_time;
                self.base_wall_time = now;
                last_output.map_or(raw_time, |last_output| raw_time.max(last_output))
            }
        };

        self.last_output = Some(output);
        output
    }

    /// Re-bases on the current source value and drops any offset, allowing the output to move
    /// backward once.
    pub fn reset(&mut self) {
        self.rebase_source();
        self.offset = 0.0;
    }

    /// Re-bases so the output continues from `time` while the source keeps running.
    pub fn rebase_to(&mut self, time: f64) {
        let raw_time = self.rebase_source();
        self.offset = time - raw_time;
    }

    fn rebase_source(&mut self) -> f64 {
        let raw_time = self.source.current_time();

        self.last_raw_time = Some(raw_time);
        self.base_time = raw_time;
        self.base_wall_time = self.wall_clock.now();
        self.last_output = Some(raw_time);
        raw_time
    }
}

impl Debug for ClockCalibrator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClockCalibrator")
            .field("base_time", &self.base_time)
            .field("base_wall_time", &self.base_wall_time)
            .field("last_raw_time", &self.last_raw_time)
            .field("last_output", &self.last_output)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    struct ManualClock {
        time: Rc<Cell<f64>>,
        rate: f64,
    }

    impl CoarseClock for ManualClock {
        fn current_time(&self) -> f64 {
            self.time.get()
        }

        fn playback_rate(&self) -> f64 {
            self.rate
        }
    }

    impl WallClock for ManualClock {
        fn now(&self) -> f64 {
            self.time.get()
        }
    }

    fn make_calibrator(rate: f64) -> (ClockCalibrator, Rc<Cell<f64>>, Rc<Cell<f64>>) {
        let audio = Rc::new(Cell::new(0.0));
        let wall = Rc::new(Cell::new(100.0));
        let calibrator = ClockCalibrator::with_wall_clock(
            Box::new(ManualClock {
                time: audio.clone(),
                rate,
            }),
            Box::new(ManualClock {
                time: wall.clone(),
                rate: 1.0,
            }),
        );

        (calibrator, audio, wall)
    }

    #[test]
    fn test_calibrator_extrapolates_between_updates() {
        let (mut calibrator, audio, wall) = make_calibrator(1.0);
        audio.set(1.0);
        assert_eq!(calibrator.calibrated_time(), 1.0);

        wall.set(100.25);
        assert_eq!(calibrator.calibrated_time(), 1.25);

        audio.set(1.3);
        assert_eq!(calibrator.calibrated_time(), 1.3);
    }

    #[test]
    fn test_calibrator_clamps_large_extrapolation() {
        let (mut calibrator, audio, wall) = make_calibrator(1.0);
        audio.set(2.0);
        calibrator.calibrated_time();

        wall.set(100.25);
        assert_eq!(calibrator.calibrated_time(), 2.25);

        wall.set(101.0);
        assert_eq!(calibrator.calibrated_time(), 2.25);
    }

    #[test]
    fn test_calibrator_never_decreases() {
        let (mut calibrator, audio, wall) = make_calibrator(2.0);
        audio.set(1.0);
        calibrator.calibrated_time();

        wall.set(100.125);
        assert_eq!(calibrator.calibrated_time(), 1.25);

        audio.set(1.125);
        assert_eq!(calibrator.calibrated_time(), 1.25);

        audio.set(0.5);
        assert_eq!(calibrator.calibrated_time(), 1.25);
    }

    #[test]
    fn test_calibrator_reset_rebases() {
        let (mut calibrator, audio, _wall) = make_calibrator(1.0);
        audio.set(5.0);
        calibrator.calibrated_time();

        audio.set(1.0);
        calibrator.reset();
        assert_eq!(calibrator.calibrated_time(), 1.0);
    }

    #[test]
    fn test_calibrator_rebase_to_moves_output() {
        let (mut calibrator, audio, wall) = make_calibrator(1.0);
        audio.set(0.75);
        wall.set(100.75);
        assert_eq!(calibrator.calibrated_time(), 0.75);

        calibrator.rebase_to(0.25);
        assert_eq!(calibrator.calibrated_time(), 0.25);

        audio.set(1.0);
        wall.set(101.0);
        assert_eq!(calibrator.calibrated_time(), 0.5);

        wall.set(101.125);
        assert_eq!(calibrator.calibrated_time(), 0.625);

        calibrator.reset();
        assert_eq!(calibrator.calibrated_time(), 1.0);
    }
}
