mod particles;

pub use particles::particle_system;
