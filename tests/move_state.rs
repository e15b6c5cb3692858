//! MoveState against a spawned squirrel: translation, facing, animator
//! parameters, and the particle trail.

use glam::{Vec2, Vec3};
use hecs::Entity;

use squirrel::components::{
    find_in_children, Animator, LocalTransform, Locomotion, ParticleEmitter, Sprite,
    SquirrelConfig,
};
use squirrel::fsm::State;
use squirrel::scene::prefabs::{euler_degrees, spawn_squirrel, SquirrelRig};
use squirrel::scene::Scene;
use squirrel::states::{MoveState, IS_RUNNING_PARAM, SPEED_PARAM};

fn setup(rig: SquirrelRig, walk: f32, multiplier: f32) -> (Scene, Entity, MoveState) {
    let mut scene = Scene::new();
    let config = SquirrelConfig::new(walk, multiplier);
    let root = spawn_squirrel(&mut scene.world, Vec3::ZERO, &config, &rig);
    let state = MoveState::new(&scene.world, root);
    (scene, root, state)
}

fn drive(scene: &mut Scene, root: Entity, input: Vec2, sprinting: bool, dt: f32) {
    {
        let mut loco = scene.world.get::<&mut Locomotion>(root).unwrap();
        loco.move_input = input;
        loco.sprinting = sprinting;
    }
    scene.time.advance(dt);
}

fn position(scene: &Scene, root: Entity) -> Vec3 {
    scene.world.get::<&LocalTransform>(root).unwrap().position
}

fn animator(scene: &Scene, root: Entity) -> (Option<f32>, Option<bool>) {
    let e = find_in_children::<Animator>(&scene.world, root).unwrap();
    let anim = scene.world.get::<&Animator>(e).unwrap();
    (anim.float(SPEED_PARAM), anim.bool(IS_RUNNING_PARAM))
}

fn flip_x(scene: &Scene, root: Entity) -> bool {
    let e = find_in_children::<Sprite>(&scene.world, root).unwrap();
    let flip = scene.world.get::<&Sprite>(e).unwrap().flip_x;
    flip
}

fn trail(scene: &Scene, root: Entity) -> Entity {
    scene
        .world
        .get::<&Locomotion>(root)
        .unwrap()
        .movement_particles
        .unwrap()
}

fn emitter_playing(scene: &Scene, root: Entity) -> bool {
    let e = trail(scene, root);
    let playing = scene.world.get::<&ParticleEmitter>(e).unwrap().is_playing();
    playing
}

#[test]
fn idle_input_emits_nothing() {
    let (mut scene, root, mut state) = setup(SquirrelRig::full(), 2.0, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::ZERO, false, 0.1);

    state.tick(&mut scene);

    assert_eq!(position(&scene, root), Vec3::ZERO);
    assert_eq!(animator(&scene, root), (Some(0.0), Some(false)));
    assert!(!state.particles_playing());
    assert!(!emitter_playing(&scene, root));
}

#[test]
fn walking_right_for_one_frame() {
    let (mut scene, root, mut state) = setup(SquirrelRig::full(), 2.0, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::new(1.0, 0.0), false, 0.5);

    state.tick(&mut scene);

    assert!((position(&scene, root) - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    assert!(!flip_x(&scene, root));
    assert_eq!(animator(&scene, root), (Some(2.0), Some(true)));
    assert!(state.particles_playing());
    assert!(emitter_playing(&scene, root));
    assert_eq!(state.last_facing(), 1.0);
}

#[test]
fn sprinting_left_mirrors_sprite_and_trail() {
    let rig = SquirrelRig::full();
    let (mut scene, root, mut state) = setup(rig, 1.5, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::new(-0.6, 0.8), true, 0.1);

    state.tick(&mut scene);

    let moved = position(&scene, root);
    assert!((moved - Vec3::new(-0.18, 0.24, 0.0)).length() < 1e-5);
    assert!(flip_x(&scene, root));
    let (speed, running) = animator(&scene, root);
    assert!((speed.unwrap() - 3.0).abs() < 1e-5);
    assert_eq!(running, Some(true));
    assert_eq!(state.last_facing(), -1.0);

    let base = rig.trail.unwrap();
    let expected = euler_degrees(base + Vec3::new(0.0, 180.0, 0.0));
    let actual = scene
        .world
        .get::<&LocalTransform>(trail(&scene, root))
        .unwrap()
        .rotation;
    assert!(actual.angle_between(expected) < 1e-3);
}

#[test]
fn turning_back_right_restores_trail_orientation() {
    let rig = SquirrelRig::full();
    let (mut scene, root, mut state) = setup(rig, 1.0, 2.0);
    state.enter(&mut scene);

    drive(&mut scene, root, Vec2::new(-1.0, 0.0), false, 0.1);
    state.tick(&mut scene);
    drive(&mut scene, root, Vec2::new(1.0, 0.0), false, 0.1);
    state.tick(&mut scene);

    let actual = scene
        .world
        .get::<&LocalTransform>(trail(&scene, root))
        .unwrap()
        .rotation;
    assert!(actual.angle_between(euler_degrees(rig.trail.unwrap())) < 1e-3);
    assert!(!flip_x(&scene, root));
}

#[test]
fn vertical_input_keeps_facing() {
    let (mut scene, root, mut state) = setup(SquirrelRig::full(), 1.0, 2.0);
    state.enter(&mut scene);

    drive(&mut scene, root, Vec2::new(-1.0, 0.0), false, 0.1);
    state.tick(&mut scene);
    drive(&mut scene, root, Vec2::new(0.005, 1.0), false, 0.1);
    state.tick(&mut scene);

    assert!(flip_x(&scene, root));
    assert_eq!(state.last_facing(), -1.0);
}

#[test]
fn stopping_keeps_particles_in_flight() {
    let (mut scene, root, mut state) = setup(SquirrelRig::full(), 2.0, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::X, false, 0.5);
    state.tick(&mut scene);
    squirrel::systems::particle_system(&mut scene.world, 0.5);

    drive(&mut scene, root, Vec2::ZERO, false, 0.1);
    state.tick(&mut scene);

    let e = trail(&scene, root);
    let emitter = scene.world.get::<&ParticleEmitter>(e).unwrap();
    assert!(!emitter.is_playing());
    assert!(emitter.alive() > 0);
    assert!(!state.particles_playing());
}

#[test]
fn exit_resets_animation_and_stops_trail() {
    let (mut scene, root, mut state) = setup(SquirrelRig::full(), 2.0, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::X, true, 0.1);
    state.tick(&mut scene);
    assert!(state.particles_playing());

    state.exit(&mut scene);

    assert_eq!(animator(&scene, root), (Some(0.0), Some(false)));
    assert!(!state.particles_playing());
    assert!(!emitter_playing(&scene, root));
}

#[test]
fn missing_capabilities_only_move_the_transform() {
    let (mut scene, root, mut state) = setup(SquirrelRig::bare(), 2.0, 2.0);
    state.enter(&mut scene);
    drive(&mut scene, root, Vec2::new(-1.0, 0.0), true, 0.25);

    state.tick(&mut scene);
    state.tick(&mut scene);

    assert!((position(&scene, root) - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-6);
    assert!(!state.particles_playing());
    // Facing only follows the trail, which this rig lacks.
    assert_eq!(state.last_facing(), 1.0);
    state.exit(&mut scene);
}

#[test]
fn trail_without_transform_still_plays() {
    let rig = SquirrelRig {
        trail_transform: false,
        ..SquirrelRig::full()
    };
    let (mut scene, root, mut state) = setup(rig, 1.0, 2.0);
    drive(&mut scene, root, Vec2::new(-1.0, 0.0), false, 0.1);

    state.tick(&mut scene);

    assert!(emitter_playing(&scene, root));
    assert!(scene
        .world
        .get::<&LocalTransform>(trail(&scene, root))
        .is_err());
    assert_eq!(state.last_facing(), -1.0);
}
