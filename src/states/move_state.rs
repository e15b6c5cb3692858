use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{
    find_in_children, Animator, LocalTransform, Locomotion, ParticleEmitter, Sprite, StopBehavior,
};
use crate::fsm::State;
use crate::scene::prefabs::{euler_degrees, to_euler_degrees};
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Squared input magnitude below which the squirrel counts as idle.
const IDLE_INPUT_SQ: f32 = 1e-4;
/// Horizontal input magnitude needed to change facing.
const FACING_DEADZONE: f32 = 1e-2;

pub const SPEED_PARAM: &str = "speed";
pub const IS_RUNNING_PARAM: &str = "is_running";

#[derive(Clone, Copy, Debug)]
struct Trail {
    emitter: Entity,
    /// Rest orientation in Euler degrees; `None` when the emitter has no
    /// transform to rotate.
    base_euler: Option<Vec3>,
}

/// Input-driven locomotion: moves the squirrel, flips its sprite, feeds the
/// animator, and runs the movement trail while moving.
///
/// Sprite, animator, and trail are all optional; whatever is missing at
/// construction is skipped for the life of the state.
pub struct MoveState {
    agent: Entity,
    sprite: Option<Entity>,
    animator: Option<Entity>,
    trail: Option<Trail>,
    particles_playing: bool,
    last_facing: f32,
}

impl MoveState {
    /// Bind to `agent` and look up its capabilities once.
    pub fn new(world: &World, agent: Entity) -> Self {
        let trail = world
            .get::<&Locomotion>(agent)
            .ok()
            .and_then(|loco| loco.movement_particles)
            .filter(|&e| world.get::<&ParticleEmitter>(e).is_ok())
            .map(|emitter| Trail {
                emitter,
                base_euler: world
                    .get::<&LocalTransform>(emitter)
                    .ok()
                    .map(|t| to_euler_degrees(t.rotation)),
            });

        Self {
            agent,
            sprite: find_in_children::<Sprite>(world, agent),
            animator: find_in_children::<Animator>(world, agent),
            trail,
            particles_playing: false,
            last_facing: 1.0,
        }
    }

    pub fn particles_playing(&self) -> bool {
        self.particles_playing
    }

    /// `1.0` when facing right, `-1.0` when facing left.
    pub fn last_facing(&self) -> f32 {
        self.last_facing
    }

    fn set_animation(&self, world: &World, speed: f32, running: bool) {
        let Some(animator) = self.animator else {
            return;
        };
        if let Ok(mut anim) = world.get::<&mut Animator>(animator) {
            anim.set_float(SPEED_PARAM, speed);
            anim.set_bool(IS_RUNNING_PARAM, running);
        }
    }

    fn stop_particles(&mut self, world: &World) {
        if let Some(trail) = self.trail {
            if let Ok(mut emitter) = world.get::<&mut ParticleEmitter>(trail.emitter) {
                emitter.stop(StopBehavior::StopEmitting);
            }
        }
        self.particles_playing = false;
    }

    /// Start or stop the trail. `horizontal` is the x input, used to aim the
    /// trail behind the squirrel.
    fn gate_particles(&mut self, world: &World, moving: bool, horizontal: f32) {
        let Some(trail) = self.trail else {
            return;
        };

        if !moving {
            if self.particles_playing {
                self.stop_particles(world);
            }
            return;
        }

        if horizontal.abs() > FACING_DEADZONE {
            self.last_facing = horizontal.signum();
        }

        if let Some(base) = trail.base_euler {
            if let Ok(mut transform) = world.get::<&mut LocalTransform>(trail.emitter) {
                let yaw = if self.last_facing < 0.0 { 180.0 } else { 0.0 };
                transform.rotation = euler_degrees(base + Vec3::new(0.0, yaw, 0.0));
            }
        }

        if !self.particles_playing {
            if let Ok(mut emitter) = world.get::<&mut ParticleEmitter>(trail.emitter) {
                emitter.play();
            }
            self.particles_playing = true;
        }
    }
}

impl State<Scene> for MoveState {
    fn name(&self) -> &str {
        "Move"
    }

    fn enter(&mut self, scene: &mut Scene) {
        self.set_animation(&scene.world, 0.0, false);
    }

    fn exit(&mut self, scene: &mut Scene) {
        self.set_animation(&scene.world, 0.0, false);
        self.stop_particles(&scene.world);
    }

    fn tick(&mut self, scene: &mut Scene) {
        let world = &scene.world;
        let Some((input, speed)) = world
            .get::<&Locomotion>(self.agent)
            .ok()
            .map(|loco| (loco.move_input, loco.speed(loco.sprinting)))
        else {
            return;
        };

        if input.length_squared() < IDLE_INPUT_SQ {
            self.set_animation(world, 0.0, false);
            self.gate_particles(world, false, 0.0);
            return;
        }

        let step = Vec3::new(input.x, input.y, 0.0) * speed * scene.time.dt;
        if let Ok(mut transform) = world.get::<&mut LocalTransform>(self.agent) {
            transform.position += step;
        }

        if input.x.abs() > FACING_DEADZONE {
            if let Some(sprite) = self.sprite {
                if let Ok(mut sprite) = world.get::<&mut Sprite>(sprite) {
                    sprite.flip_x = input.x < 0.0;
                }
            }
        }

        self.set_animation(world, input.length() * speed, true);
        self.gate_particles(world, true, input.x);
    }
}
