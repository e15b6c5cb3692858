use glam::{EulerRot, Quat, Vec3};
use hecs::{Entity, World};

use crate::components::*;

// ---------------------------------------------------------------------------
// SquirrelRig: which optional pieces a spawned squirrel carries
// ---------------------------------------------------------------------------

/// Optional parts of the squirrel prefab. Every part can be left out; the
/// movement state copes with any combination.
#[derive(Clone, Copy, Debug)]
pub struct SquirrelRig {
    /// Child entity with a `Sprite`.
    pub sprite: bool,
    /// Child entity with an `Animator` (shares the sprite's visual child).
    pub animator: bool,
    /// Trail emitter child. `Some(euler_degrees)` gives its rest orientation.
    pub trail: Option<Vec3>,
    /// Whether the trail child carries a `LocalTransform` at all.
    pub trail_transform: bool,
    /// Particles spawned per second while the trail emits.
    pub trail_rate: f32,
}

impl SquirrelRig {
    /// Sprite, animator, and a trail pointing back along -X.
    pub fn full() -> Self {
        Self {
            sprite: true,
            animator: true,
            trail: Some(Vec3::new(0.0, 0.0, 90.0)),
            trail_transform: true,
            trail_rate: 30.0,
        }
    }

    /// Transform only.
    pub fn bare() -> Self {
        Self {
            sprite: false,
            animator: false,
            trail: None,
            trail_transform: false,
            trail_rate: 0.0,
        }
    }
}

impl Default for SquirrelRig {
    fn default() -> Self {
        Self::full()
    }
}

/// Emitter rotation from Euler angles in degrees (x, y, z), applied Y-X-Z.
pub fn euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Inverse of [`euler_degrees`].
pub fn to_euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

// ---------------------------------------------------------------------------
// spawn_squirrel
// ---------------------------------------------------------------------------

/// Spawn the squirrel root plus the children its rig asks for.
/// Returns the root entity, which carries `LocalTransform` and `Locomotion`.
pub fn spawn_squirrel(
    world: &mut World,
    position: Vec3,
    config: &SquirrelConfig,
    rig: &SquirrelRig,
) -> Entity {
    let root = world.spawn((LocalTransform::new(position), Locomotion::new(config)));

    // Visual child: sprite and animator live on the same entity when both
    // are present, like a sprite sheet driven by its animator.
    if rig.sprite || rig.animator {
        let visual = world.spawn((LocalTransform::new(Vec3::ZERO),));
        if rig.sprite {
            let _ = world.insert_one(visual, Sprite::default());
        }
        if rig.animator {
            let _ = world.insert_one(visual, Animator::default());
        }
        add_child(world, root, visual);
    }

    if let Some(euler) = rig.trail {
        let trail = world.spawn((ParticleEmitter::new(rig.trail_rate),));
        if rig.trail_transform {
            let offset = Vec3::new(0.0, -0.2, 0.0);
            let _ = world.insert_one(
                trail,
                LocalTransform::new(offset).with_rotation(euler_degrees(euler)),
            );
        }
        add_child(world, root, trail);
        if let Ok(mut loco) = world.get::<&mut Locomotion>(root) {
            loco.movement_particles = Some(trail);
        }
    }

    root
}
