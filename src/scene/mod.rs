use hecs::World;

use crate::engine::time::FrameTimer;

pub mod prefabs;

/// Everything a state can touch while it runs: the entity world and the
/// frame clock.
pub struct Scene {
    pub world: World,
    pub time: FrameTimer,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_timer(FrameTimer::new())
    }

    pub fn with_timer(time: FrameTimer) -> Self {
        Self {
            world: World::new(),
            time,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
