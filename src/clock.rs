//! Simulation clock.
//!
//! Host timestamps (seconds) become elapsed reference ticks, 60 per second,
//! so per-tick speeds keep their meaning at any refresh rate.

pub const TICKS_PER_SECOND: f64 = 60.0;

#[derive(Clone, Debug, Default)]
pub struct SimulationClock {
    frame: u64,
    ticks: f64,
    earth_rotation: f64,
    last_time: Option<f64>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference ticks elapsed since the previous call, at most
    /// `max_frame_seconds` worth. The first call after a reset yields 0.
    pub fn elapsed_ticks(&mut self, now: f64, max_frame_seconds: f64) -> f64 {
        if !now.is_finite() {
            return 0.0;
        }
        let elapsed = match self.last_time {
            Some(prev) => (now - prev).clamp(0.0, max_frame_seconds),
            None => 0.0,
        };
        self.last_time = Some(now);
        elapsed * TICKS_PER_SECOND
    }

    /// Drops the timestamp reference so time spent paused is never integrated.
    pub fn reset_reference(&mut self) {
        self.last_time = None;
    }

    pub fn advance(&mut self, ticks: f64, spin_per_tick: f64) {
        self.frame += 1;
        self.ticks += ticks;
        self.earth_rotation += spin_per_tick * ticks;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ticks(&self) -> f64 {
        self.ticks
    }

    pub fn earth_rotation(&self) -> f64 {
        self.earth_rotation
    }
}
