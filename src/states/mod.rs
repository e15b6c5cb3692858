mod move_state;

pub use move_state::{MoveState, IS_RUNNING_PARAM, SPEED_PARAM};
