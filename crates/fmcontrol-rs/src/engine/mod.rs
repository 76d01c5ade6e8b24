//! Hierarchical/parallel state-machine engine.
//!
//! The engine holds a tree of states in an arena addressed by [`StateId`]
//! handles, the set of currently active leaf states, and a single-threaded
//! run-to-completion dispatch loop. Guards never call back into the engine;
//! side effects go through an [`Outbox`] and are delivered on a later turn.

pub mod machine;
pub mod state;

pub use machine::{EngineError, StateMachine};
pub use state::{Guard, StateId, StateKind, Transition};

use crate::event::Event;
use alloc::collections::VecDeque;

/// Side-effect channel handed to every guard-action callback.
///
/// A callback must not dispatch events synchronously; it may only queue them
/// here. `emit` queues a response for the external caller, `raise` queues an
/// internal event that the owning device feeds back into the engine on the
/// next turn of its run-to-completion loop.
#[derive(Default)]
pub struct Outbox {
    responses: VecDeque<Event>,
    raised: VecDeque<Event>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response event for the external caller.
    pub fn emit(&mut self, event: Event) {
        self.responses.push_back(event);
    }

    /// Queues an internal event for delivery on a later dispatch turn.
    pub fn raise(&mut self, event: Event) {
        self.raised.push_back(event);
    }

    /// Removes and returns the oldest queued response, if any.
    pub fn pop_response(&mut self) -> Option<Event> {
        self.responses.pop_front()
    }

    /// Removes and returns the oldest internally raised event, if any.
    pub(crate) fn pop_raised(&mut self) -> Option<Event> {
        self.raised.pop_front()
    }

    /// Number of responses currently queued.
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }
}
