use hecs::{Entity, RefMut, World};

use crate::components::{Locomotion, SquirrelConfig};
use crate::engine::input::InputSource;
use crate::error::FsmError;
use crate::fsm::{StateId, StateMachine};
use crate::scene::Scene;
use crate::states::MoveState;

/// Agent host for one squirrel: owns its input binding and state machine,
/// and forwards engine ticks into the machine.
pub struct Squirrel {
    entity: Entity,
    machine: StateMachine<Scene>,
    input: Box<dyn InputSource>,
    move_state: StateId,
    enabled: bool,
}

impl Squirrel {
    /// Build the movement state for `entity` and activate it.
    /// The input binding stays closed until [`enable`](Self::enable).
    pub fn new(
        scene: &mut Scene,
        entity: Entity,
        config: &SquirrelConfig,
        input: Box<dyn InputSource>,
    ) -> Result<Self, FsmError> {
        let mut machine = StateMachine::new().with_debug(config.debug);
        let move_state = machine.add_state(MoveState::new(&scene.world, entity));
        machine.initialize(scene, move_state)?;

        Ok(Self {
            entity,
            machine,
            input,
            move_state,
            enabled: false,
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn machine(&self) -> &StateMachine<Scene> {
        &self.machine
    }

    pub fn move_state(&self) -> StateId {
        self.move_state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open the input binding and start receiving ticks.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.input.open();
        self.enabled = true;
        tracing::debug!(entity = ?self.entity, "squirrel enabled");
    }

    /// Close the input binding. Ticks are ignored until re-enabled.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.input.close();
        self.enabled = false;
        tracing::debug!(entity = ?self.entity, "squirrel disabled");
    }

    /// Movement parameters and latest input for this squirrel.
    pub fn locomotion<'w>(&self, world: &'w World) -> Option<RefMut<'w, Locomotion>> {
        world.get::<&mut Locomotion>(self.entity).ok()
    }

    pub fn speed(&self, world: &World, running: bool) -> f32 {
        self.locomotion(world)
            .map(|loco| loco.speed(running))
            .unwrap_or(0.0)
    }

    /// Per-frame update: sample input, then dispatch the frame tick.
    pub fn update(&mut self, scene: &mut Scene) -> Result<(), FsmError> {
        if !self.enabled {
            return Ok(());
        }
        let dt = scene.time.dt;
        let sample = self.input.sample(dt);
        if let Some(mut loco) = self.locomotion(&scene.world) {
            loco.move_input = sample.move_axis;
            loco.sprinting = sample.sprinting();
        }
        self.machine.update(scene, dt)
    }

    /// Per-fixed-step update.
    pub fn fixed_update(&mut self, scene: &mut Scene) -> Result<(), FsmError> {
        if !self.enabled {
            return Ok(());
        }
        self.machine.fixed_update(scene)
    }
}
