use std::{collections::VecDeque, fmt::Display, time::Instant};

/// Rolling per-phase timings of the last few ticks.
#[derive(Debug, Clone)]
pub struct PerfRecorder {
    name: String,
    current: Instant,
    animation_times: VecDeque<f32>,
    physics_times: VecDeque<f32>,
}

impl PerfRecorder {
    const MAX_FRAMES: usize = 32;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: Instant::now(),
            animation_times: VecDeque::with_capacity(Self::MAX_FRAMES),
            physics_times: VecDeque::with_capacity(Self::MAX_FRAMES),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn frame_begin(&mut self) {
        self.current = Instant::now();
    }

    pub fn frame_animation_end(&mut self) {
        let now = Instant::now();
        push_sample(&mut self.animation_times, (now - self.current).as_secs_f32());
        self.current = now;
    }

    pub fn frame_physics_end(&mut self) {
        let now = Instant::now();
        push_sample(&mut self.physics_times, (now - self.current).as_secs_f32());
        self.current = now;
    }

    pub fn sample_count(&self) -> usize {
        self.animation_times.len()
    }

    pub fn report(&self) -> PerfReport {
        PerfReport {
            name: &self.name,
            animation_avg: average(&self.animation_times),
            physics_avg: average(&self.physics_times),
        }
    }
}

fn push_sample(samples: &mut VecDeque<f32>, sample: f32) {
    if PerfRecorder::MAX_FRAMES <= samples.len() {
        samples.pop_front();
    }

    samples.push_back(sample);
}

fn average(samples: &VecDeque<f32>) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().sum::<f32>() / samples.len() as f32
}

#[derive(Debug, Clone)]
pub struct PerfReport<'a> {
    pub name: &'a str,
    pub animation_avg: f32,
    pub physics_avg: f32,
}

impl<'a> Display for PerfReport<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] animation_avg: {:.2}ms, physics_avg: {:.2}ms, total: {:.2}ms",
            self.name,
            self.animation_avg * 1000.0,
            self.physics_avg * 1000.0,
            (self.animation_avg + self.physics_avg) * 1000.0
        )
    }
}
