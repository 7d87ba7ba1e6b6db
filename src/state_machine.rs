//! Per-turn exchange state machine
//!
//! Pure state transitions in the Elm Architecture style: the transition
//! function returns effects, and the session runtime executes them.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ExchangeContext, ExchangeState};
pub use transition::{transition, TransitionError};
