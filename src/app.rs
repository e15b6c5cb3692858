use glam::{Vec2, Vec3};

use crate::agent::Squirrel;
use crate::components::{find_in_children, LocalTransform, ParticleEmitter, Sprite, SquirrelConfig};
use crate::engine::input::{InputState, ScriptedInput};
use crate::engine::time::FrameTimer;
use crate::error::FsmError;
use crate::scene::prefabs::{spawn_squirrel, SquirrelRig};
use crate::scene::Scene;
use crate::systems::particle_system;

/// Settings for a headless run.
#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub squirrel: SquirrelConfig,
    /// Simulated wall time, in seconds.
    pub seconds: f32,
    pub frame_dt: f32,
    pub fixed_dt: f32,
    /// Spawn the squirrel without sprite, animator, or trail.
    pub bare: bool,
}

/// State of the squirrel when the run ends.
#[derive(Clone, Copy, Debug)]
pub struct Summary {
    pub position: Vec3,
    pub flip_x: Option<bool>,
    pub particles_alive: Option<u32>,
    pub frames: usize,
    pub fixed_steps: usize,
}

/// Idle, walk right, sprint up-left, idle.
pub fn demo_script() -> ScriptedInput {
    ScriptedInput::new()
        .then(0.5, InputState::default())
        .then(1.0, InputState::new(Vec2::X, 0.0))
        .then(1.0, InputState::new(Vec2::new(-0.6, 0.8), 1.0))
        .then(0.5, InputState::default())
}

pub struct SimApp {
    scene: Scene,
    squirrel: Squirrel,
    frames: usize,
    fixed_steps: usize,
    elapsed: f32,
    report_debt: f32,
}

impl SimApp {
    pub fn new(config: &SimConfig, input: ScriptedInput) -> Result<Self, FsmError> {
        let mut scene = Scene::with_timer(FrameTimer::with_fixed_dt(config.fixed_dt));
        let rig = if config.bare {
            SquirrelRig::bare()
        } else {
            SquirrelRig::full()
        };
        let entity = spawn_squirrel(&mut scene.world, Vec3::ZERO, &config.squirrel, &rig);
        let mut squirrel = Squirrel::new(&mut scene, entity, &config.squirrel, Box::new(input))?;
        squirrel.enable();

        Ok(Self {
            scene,
            squirrel,
            frames: 0,
            fixed_steps: 0,
            elapsed: 0.0,
            report_debt: 0.0,
        })
    }

    pub fn run(&mut self, seconds: f32, frame_dt: f32) -> Summary {
        let frame_dt = frame_dt.max(1e-4);
        while self.elapsed < seconds {
            self.frame(frame_dt);
        }
        self.squirrel.disable();
        self.summary()
    }

    fn frame(&mut self, dt: f32) {
        self.scene.time.advance(dt);
        self.frames += 1;
        self.elapsed += dt;

        if let Err(e) = self.squirrel.update(&mut self.scene) {
            tracing::error!(error = %e, "squirrel frame update failed");
        }

        let steps = self.scene.time.fixed_steps();
        for _ in 0..steps {
            if let Err(e) = self.squirrel.fixed_update(&mut self.scene) {
                tracing::error!(error = %e, "squirrel fixed update failed");
            }
        }
        self.fixed_steps += steps;

        particle_system(&mut self.scene.world, dt);

        self.report_debt += dt;
        if self.report_debt >= 1.0 {
            self.report_debt -= 1.0;
            let position = self.position();
            tracing::info!(
                t = self.elapsed,
                x = position.x,
                y = position.y,
                "squirrel position"
            );
        }
    }

    fn position(&self) -> Vec3 {
        self.scene
            .world
            .get::<&LocalTransform>(self.squirrel.entity())
            .map(|t| t.position)
            .unwrap_or(Vec3::ZERO)
    }

    fn summary(&self) -> Summary {
        let world = &self.scene.world;
        let root = self.squirrel.entity();
        let flip_x = find_in_children::<Sprite>(world, root)
            .and_then(|e| world.get::<&Sprite>(e).ok().map(|s| s.flip_x));
        let particles_alive = find_in_children::<ParticleEmitter>(world, root)
            .and_then(|e| world.get::<&ParticleEmitter>(e).ok().map(|p| p.alive()));

        Summary {
            position: self.position(),
            flip_x,
            particles_alive,
            frames: self.frames,
            fixed_steps: self.fixed_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bare: bool) -> SimConfig {
        SimConfig {
            squirrel: SquirrelConfig::new(2.0, 2.0),
            seconds: 3.0,
            frame_dt: 0.05,
            fixed_dt: 0.02,
            bare,
        }
    }

    #[test]
    fn demo_run_walks_then_sprints_left() {
        let cfg = config(false);
        let mut app = SimApp::new(&cfg, demo_script()).unwrap();
        let summary = app.run(cfg.seconds, cfg.frame_dt);

        // 1s walking right at 2, then 1s sprinting at 4 along (-0.6, 0.8).
        assert!((summary.position.x - (2.0 - 2.4)).abs() < 0.35);
        assert!((summary.position.y - 3.2).abs() < 0.35);
        assert_eq!(summary.flip_x, Some(true));
        assert!(summary.particles_alive.unwrap_or(0) > 0);
        assert!(summary.fixed_steps >= 140);
    }

    #[test]
    fn bare_rig_still_moves() {
        let cfg = config(true);
        let mut app = SimApp::new(&cfg, demo_script()).unwrap();
        let summary = app.run(cfg.seconds, cfg.frame_dt);
        assert!(summary.position.length() > 1.0);
        assert_eq!(summary.flip_x, None);
        assert_eq!(summary.particles_alive, None);
    }
}
