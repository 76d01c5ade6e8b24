use super::Outbox;
use crate::event::{Event, EventKind};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Handle addressing one state inside a [`StateMachine`](super::StateMachine)
/// arena.
///
/// States reference each other exclusively through these indices; tree walks
/// are index lookups and there are no parent pointers to dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) usize);

/// Structural role of a state within the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// Leaf state with no children.
    Simple,
    /// Composite with exactly one active child at a time.
    Exclusive,
    /// Composite whose children are all active simultaneously.
    Parallel,
    /// Leaf whose activation signals the parent composite as finished.
    Final,
}

/// Guard-action callback run when a transition's event matches.
///
/// The boolean result decides whether the transition is taken; a `false`
/// result keeps the active configuration unchanged while leaving any side
/// effects already queued on the [`Outbox`] in place.
pub type Guard = Box<dyn FnMut(&mut Outbox, &Event) -> bool>;

/// A transition owned by its source state.
pub struct Transition {
    /// Event kind this transition matches.
    pub event: EventKind,
    /// Optional guard-action callback. `None` is unconditional.
    pub guard: Option<Guard>,
    /// Target state. `None` makes this an internal transition that never
    /// changes the active configuration.
    pub target: Option<StateId>,
}

/// One node of the state tree.
pub(crate) struct StateNode {
    pub(crate) name: String,
    pub(crate) kind: StateKind,
    pub(crate) parent: Option<StateId>,
    pub(crate) children: Vec<StateId>,
    /// Entry child for `Exclusive` composites.
    pub(crate) initial: Option<StateId>,
    pub(crate) transitions: Vec<Transition>,
}
