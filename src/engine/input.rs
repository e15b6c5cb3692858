use std::collections::VecDeque;

use glam::Vec2;

/// Sprint axis values above this count as "held".
pub const SPRINT_THRESHOLD: f32 = 0.5;

/// One frame's worth of player input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub move_axis: Vec2,
    pub sprint_axis: f32,
}

impl InputState {
    pub fn new(move_axis: Vec2, sprint_axis: f32) -> Self {
        Self {
            move_axis,
            sprint_axis,
        }
    }

    pub fn sprinting(&self) -> bool {
        self.sprint_axis > SPRINT_THRESHOLD
    }
}

/// An input binding the agent opens while it is active.
pub trait InputSource {
    fn open(&mut self);

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Read the bound axes for a frame lasting `dt` seconds.
    /// A closed binding reads as neutral input.
    fn sample(&mut self, dt: f32) -> InputState;
}

/// Plays back a fixed timeline of inputs. Each segment holds its input for
/// a number of seconds; after the last segment the input goes neutral.
pub struct ScriptedInput {
    segments: VecDeque<(f32, InputState)>,
    open: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self {
            segments: VecDeque::new(),
            open: false,
        }
    }

    pub fn then(mut self, seconds: f32, input: InputState) -> Self {
        self.segments.push_back((seconds.max(0.0), input));
        self
    }
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for ScriptedInput {
    fn open(&mut self) {
        self.open = true;
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn sample(&mut self, dt: f32) -> InputState {
        if !self.open {
            return InputState::default();
        }
        while let Some((left, _)) = self.segments.front() {
            if *left > 0.0 {
                break;
            }
            self.segments.pop_front();
        }
        let Some((left, input)) = self.segments.front_mut() else {
            return InputState::default();
        };
        let sample = *input;
        *left -= dt;
        sample
    }
}

/// Input that never changes. Handy for tests and for pinning the agent.
pub struct ConstantInput {
    input: InputState,
    open: bool,
}

impl ConstantInput {
    pub fn new(input: InputState) -> Self {
        Self { input, open: false }
    }
}

impl InputSource for ConstantInput {
    fn open(&mut self) {
        self.open = true;
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn sample(&mut self, _dt: f32) -> InputState {
        if self.open {
            self.input
        } else {
            InputState::default()
        }
    }
}
