use std::time::Instant;

/// Amount a single scrub command moves time while paused.
pub const MANUAL_TIME_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubDirection {
    Backward,
    Forward,
}

impl ScrubDirection {
    pub fn signum(self) -> f64 {
        match self {
            Self::Backward => -1.0,
            Self::Forward => 1.0,
        }
    }
}

/// Shader time. Advances with the monotonic clock while running; while paused
/// it only moves through explicit scrubbing.
pub struct TimeState {
    pub time: f64,
    paused: bool,
    last_instant: Instant,
}

impl TimeState {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            time: 0.0,
            paused: false,
            last_instant: start,
        }
    }

    /// Called once per presented frame.
    pub fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        if !self.paused {
            self.time += dt;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Step time by `MANUAL_TIME_STEP`. Returns false (and does nothing) when
    /// not paused.
    pub fn scrub(&mut self, direction: ScrubDirection) -> bool {
        if !self.paused {
            return false;
        }
        self.time += direction.signum() * MANUAL_TIME_STEP;
        true
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
