use glam::Vec2;
use hecs::Entity;

pub const DEFAULT_WALK_SPEED: f32 = 1.5;
pub const DEFAULT_RUN_MULTIPLIER: f32 = 2.0;

/// Tunables for a squirrel agent. Negative speeds are clamped to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquirrelConfig {
    walk_speed: f32,
    run_multiplier: f32,
    /// Emit state machine traces.
    pub debug: bool,
}

impl SquirrelConfig {
    pub fn new(walk_speed: f32, run_multiplier: f32) -> Self {
        Self {
            walk_speed: walk_speed.max(0.0),
            run_multiplier: run_multiplier.max(0.0),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn walk_speed(&self) -> f32 {
        self.walk_speed
    }

    pub fn run_multiplier(&self) -> f32 {
        self.run_multiplier
    }
}

impl Default for SquirrelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WALK_SPEED, DEFAULT_RUN_MULTIPLIER)
    }
}

/// Attached to the squirrel entity. Holds the movement parameters and the
/// latest input sample that states read each frame.
#[derive(Clone, Debug)]
pub struct Locomotion {
    walk_speed: f32,
    run_multiplier: f32,
    pub move_input: Vec2,
    pub sprinting: bool,
    /// Emitter entity for the movement trail, if the rig has one.
    pub movement_particles: Option<Entity>,
}

impl Locomotion {
    pub fn new(config: &SquirrelConfig) -> Self {
        Self {
            walk_speed: config.walk_speed(),
            run_multiplier: config.run_multiplier(),
            move_input: Vec2::ZERO,
            sprinting: false,
            movement_particles: None,
        }
    }

    pub fn walk_speed(&self) -> f32 {
        self.walk_speed
    }

    pub fn set_walk_speed(&mut self, speed: f32) {
        self.walk_speed = speed.max(0.0);
    }

    pub fn run_multiplier(&self) -> f32 {
        self.run_multiplier
    }

    pub fn set_run_multiplier(&mut self, multiplier: f32) {
        self.run_multiplier = multiplier.max(0.0);
    }

    pub fn run_speed(&self) -> f32 {
        self.walk_speed * self.run_multiplier
    }

    pub fn speed(&self, running: bool) -> f32 {
        if running {
            self.run_speed()
        } else {
            self.walk_speed
        }
    }
}
