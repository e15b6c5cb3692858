//! Frame-driven state machine and movement controller for a 2D squirrel.

pub mod agent;
pub mod app;
pub mod components;
pub mod engine;
pub mod error;
pub mod fsm;
pub mod scene;
pub mod states;
pub mod systems;

pub use agent::Squirrel;
pub use error::FsmError;
pub use fsm::{Owner, State, StateChanged, StateId, StateMachine, Steps, Wait};
