use hecs::World;

use crate::components::ParticleEmitter;

/// Advance every emitter by one render frame. Runs after the agents have
/// toggled their emitters for the frame.
pub fn particle_system(world: &mut World, dt: f32) {
    for (_e, emitter) in world.query_mut::<&mut ParticleEmitter>() {
        emitter.advance(dt);
    }
}
