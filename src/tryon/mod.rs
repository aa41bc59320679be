pub mod fsm;
mod orchestrator;
mod types;

pub use fsm::{TryOnEvent, TryOnState, TryOnStateMachine};
pub use orchestrator::{
    AUTO_CROP, AUTO_MASK, DENOISE_STEPS, GUIDANCE_SCALE, PROMPT, TryOnOrchestrator,
};
pub use types::{ProductDetails, TryOnRequest, TryOnResult};
