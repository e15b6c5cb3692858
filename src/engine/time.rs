pub const DEFAULT_FIXED_DT: f32 = 1.0 / 50.0;

/// Frame clock plus the fixed-step accumulator for simulation ticks.
pub struct FrameTimer {
    /// Duration of the last render frame, in seconds.
    pub dt: f32,
    /// Duration of one fixed simulation step, in seconds.
    pub fixed_dt: f32,
    accumulator: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::with_fixed_dt(DEFAULT_FIXED_DT)
    }

    pub fn with_fixed_dt(fixed_dt: f32) -> Self {
        Self {
            dt: 0.0,
            fixed_dt,
            accumulator: 0.0,
        }
    }

    /// Step the clock by the length of the frame that just ended.
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt.max(0.0);
        self.accumulator += self.dt;
    }

    /// Consume whole fixed steps owed by the accumulator.
    pub fn fixed_steps(&mut self) -> usize {
        if self.fixed_dt <= 0.0 {
            return 0;
        }
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        steps
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
