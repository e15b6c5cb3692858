use std::collections::HashMap;

use glam::{Quat, Vec3};
use hecs::{Component, Entity, World};

pub mod character;

pub use character::{Locomotion, SquirrelConfig};

/// Spatial transform with position, rotation, and scale (local space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Points to the parent entity in the hierarchy.
pub struct Parent(pub Entity);

/// Lists child entities in the hierarchy.
pub struct Children(pub Vec<Entity>);

/// Attach `child` under `parent`.
pub fn add_child(world: &mut World, parent: Entity, child: Entity) {
    let has_children = world.get::<&Children>(parent).is_ok();
    if has_children {
        if let Ok(mut children) = world.get::<&mut Children>(parent) {
            if !children.0.contains(&child) {
                children.0.push(child);
            }
        }
    } else {
        let _ = world.insert_one(parent, Children(vec![child]));
    }

    let _ = world.insert_one(child, Parent(parent));
}

/// Depth-first search for a `T` on `root` or any of its descendants.
pub fn find_in_children<T: Component>(world: &World, root: Entity) -> Option<Entity> {
    if world.get::<&T>(root).is_ok() {
        return Some(root);
    }
    let children = world
        .get::<&Children>(root)
        .map(|c| c.0.clone())
        .unwrap_or_default();
    children
        .into_iter()
        .find_map(|child| find_in_children::<T>(world, child))
}

/// 2D sprite renderer. Only the horizontal flip is driven from gameplay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sprite {
    pub flip_x: bool,
}

/// Named animation parameters read by the animator runtime.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    floats: HashMap<String, f32>,
    bools: HashMap<String, bool>,
}

impl Animator {
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }
}

/// How [`ParticleEmitter::stop`] treats particles already in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopBehavior {
    /// Stop spawning and leave the live count as it is.
    StopEmitting,
    /// Stop spawning and remove every live particle.
    StopEmittingAndClear,
}

/// Particle emitter handle. Emission itself is simulated by the host;
/// gameplay only toggles it. `alive` counts particles spawned since the last
/// clear and saturates at `u32::MAX`.
#[derive(Clone, Debug, Default)]
pub struct ParticleEmitter {
    emitting: bool,
    alive: u32,
    /// Particles spawned per second while emitting.
    pub rate: f32,
    spawn_debt: f32,
}

impl ParticleEmitter {
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            ..Self::default()
        }
    }

    pub fn play(&mut self) {
        self.emitting = true;
    }

    pub fn stop(&mut self, behavior: StopBehavior) {
        self.emitting = false;
        self.spawn_debt = 0.0;
        if behavior == StopBehavior::StopEmittingAndClear {
            self.alive = 0;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.emitting
    }

    /// Live particle count.
    pub fn alive(&self) -> u32 {
        self.alive
    }

    /// Spawn whole particles owed for `dt` seconds of emission.
    pub fn advance(&mut self, dt: f32) {
        if !self.emitting {
            return;
        }
        self.spawn_debt += self.rate * dt;
        let spawned = self.spawn_debt.floor();
        self.spawn_debt -= spawned;
        self.alive = self.alive.saturating_add(spawned as u32);
    }
}
