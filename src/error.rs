use thiserror::Error;

use crate::fsm::StateId;

#[derive(Debug, Error, PartialEq)]
pub enum FsmError {
    #[error("State {0:?} is not registered with this machine")]
    UnknownState(StateId),

    #[error("Transition aborted in state '{state}': {reason}")]
    Aborted { state: String, reason: String },
}
