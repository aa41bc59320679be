use crate::{Error, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryOnState {
    Idle,
    AcquiringImages,
    Invoking,
    Validating,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryOnEvent {
    Start,
    ImagesAcquired,
    InferenceReturned,
    ResponseValidated,
    ErrorOccurred,
}

/// Linear pipeline: Idle -> AcquiringImages -> Invoking -> Validating -> Done,
/// with Failed reachable from every non-terminal state.
#[derive(Debug)]
pub struct TryOnStateMachine {
    state: TryOnState,
}

impl Default for TryOnStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TryOnStateMachine {
    pub fn new() -> Self {
        Self {
            state: TryOnState::Idle,
        }
    }

    pub fn current_state(&self) -> TryOnState {
        self.state
    }

    pub fn transition(&mut self, event: TryOnEvent) -> Result<TryOnState> {
        let old_state = self.state;
        debug!("Try-on FSM processing event {:?} in state {:?}", event, old_state);

        let new_state = match (old_state, event) {
            (TryOnState::Idle, TryOnEvent::Start) => TryOnState::AcquiringImages,
            (TryOnState::AcquiringImages, TryOnEvent::ImagesAcquired) => TryOnState::Invoking,
            (TryOnState::Invoking, TryOnEvent::InferenceReturned) => TryOnState::Validating,
            (TryOnState::Validating, TryOnEvent::ResponseValidated) => TryOnState::Done,
            (state, TryOnEvent::ErrorOccurred) if !is_terminal(state) => TryOnState::Failed,
            _ => {
                warn!(
                    "Invalid try-on transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::internal(format!(
                    "Invalid try-on transition from {old_state:?} with event {event:?}"
                )));
            }
        };

        info!("Try-on state transition: {:?} -> {:?}", old_state, new_state);
        self.state = new_state;
        Ok(new_state)
    }

    pub fn is_terminal(&self) -> bool {
        is_terminal(self.state)
    }
}

fn is_terminal(state: TryOnState) -> bool {
    matches!(state, TryOnState::Done | TryOnState::Failed)
}
