use super::state::{Guard, StateId, StateKind, StateNode, Transition};
use super::Outbox;
use crate::event::{Event, EventKind};
use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use log::{debug, error, trace};

/// Engine-internal consistency fault.
///
/// These are state-shape faults of the machine itself, not ordinary hardware
/// failures; the owning device treats them as fatal for the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An `Exclusive` composite was entered without an initial child defined.
    MissingInitialChild { state: String },
    /// `dispatch` was called before `start`.
    NotStarted,
    /// A transition targets a state that is not part of this machine's tree.
    UnknownState,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInitialChild { state } => {
                write!(f, "Exclusive state '{state}' has no initial child")
            }
            Self::NotStarted => write!(f, "State machine has not been started"),
            Self::UnknownState => write!(f, "Transition targets an unknown state"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

/// Hierarchical state machine with run-to-completion event dispatch.
///
/// The tree is built once with [`add_state`](Self::add_state),
/// [`set_initial`](Self::set_initial) and
/// [`add_transition`](Self::add_transition), then driven exclusively through
/// [`start`](Self::start) and [`dispatch`](Self::dispatch). The active
/// configuration is the set of active *leaf* states; activity of composite
/// ancestors is derived from it and therefore always consistent with the
/// tree shape.
pub struct StateMachine {
    states: Vec<StateNode>,
    root: Option<StateId>,
    /// Currently active leaf states.
    active: Vec<StateId>,
    /// Parent composites whose `Final` child was entered and whose
    /// completion transition has not fired yet.
    pending_completions: VecDeque<StateId>,
    started: bool,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            root: None,
            active: Vec::new(),
            pending_completions: VecDeque::new(),
            started: false,
        }
    }

    /// Adds a state to the arena. The first state added without a parent
    /// becomes the root.
    pub fn add_state(&mut self, name: &str, kind: StateKind, parent: Option<StateId>) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(StateNode {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            initial: None,
            transitions: Vec::new(),
        });
        if let Some(parent) = parent {
            self.states[parent.0].children.push(id);
        } else if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Declares the entry child of an `Exclusive` composite.
    pub fn set_initial(&mut self, parent: StateId, child: StateId) {
        self.states[parent.0].initial = Some(child);
    }

    /// Installs a transition on `source`. Transitions are matched in
    /// installation order; the first one whose event kind matches wins.
    pub fn add_transition(
        &mut self,
        source: StateId,
        event: EventKind,
        target: Option<StateId>,
        guard: Option<Guard>,
    ) {
        self.states[source.0].transitions.push(Transition {
            event,
            guard,
            target,
        });
    }

    /// Enters the root chain and processes any immediate region completions.
    pub fn start(&mut self, outbox: &mut Outbox) -> Result<(), EngineError> {
        let root = self.root.ok_or(EngineError::UnknownState)?;
        self.active.clear();
        self.enter(root)?;
        self.started = true;
        self.run_completions(outbox)
    }

    /// Delivers one event to the current active configuration.
    ///
    /// The active states are snapshotted most deeply nested first and the
    /// event is offered to each of them. A match at a state shields that
    /// state's *ancestors* (the innermost handler wins), but deliberately not
    /// its sibling parallel regions: every region of a `Parallel` composite
    /// receives the event independently, and a region with an unrelated
    /// transition for the same event kind will match it. Modelers compensate
    /// with explicit suppressing transitions where that matters.
    ///
    /// A guard returning `false` keeps its queued side effects but changes no
    /// state. After the delivery loop, completion transitions of any regions
    /// that reached a `Final` state are fired.
    pub fn dispatch(&mut self, outbox: &mut Outbox, event: &Event) -> Result<(), EngineError> {
        if !self.started {
            return Err(EngineError::NotStarted);
        }
        let kind = event.kind();
        let snapshot = self.active_states_deepest_first();
        let mut shielded = vec![false; self.states.len()];

        for sid in snapshot {
            if shielded[sid.0] {
                continue;
            }
            // A region exited earlier in this same dispatch no longer
            // receives the event.
            if !self.is_active(sid) {
                continue;
            }
            let Some(idx) = self.states[sid.0]
                .transitions
                .iter()
                .position(|t| t.event == kind)
            else {
                continue;
            };

            trace!(
                "[SM] '{}' matches {:?}",
                self.states[sid.0].name,
                kind
            );
            let (taken, target) = {
                let transition = &mut self.states[sid.0].transitions[idx];
                let target = transition.target;
                let taken = match transition.guard.as_mut() {
                    Some(guard) => guard(outbox, event),
                    None => true,
                };
                (taken, target)
            };

            // The event is consumed at this level; ancestors (including any
            // default-rejection transitions at the root) stay quiet.
            let mut ancestor = self.states[sid.0].parent;
            while let Some(a) = ancestor {
                shielded[a.0] = true;
                ancestor = self.states[a.0].parent;
            }

            if taken {
                if let Some(target) = target {
                    debug!(
                        "[SM] {:?}: '{}' -> '{}'",
                        kind,
                        self.states[sid.0].name,
                        self.states[target.0].name
                    );
                    self.take_transition(sid, target)?;
                }
            } else {
                trace!(
                    "[SM] guard declined {:?} in '{}'; configuration unchanged",
                    kind,
                    self.states[sid.0].name
                );
            }
        }

        self.run_completions(outbox)
    }

    /// Abandons the current configuration and activates `target`'s chain.
    /// Used by the owning device to enter its error state on an engine fault.
    pub fn force_state(&mut self, target: StateId) -> Result<(), EngineError> {
        self.active.clear();
        self.pending_completions.clear();
        self.enter(target)
    }

    /// Returns `true` if `id` is an active leaf or an ancestor of one.
    pub fn is_active(&self, id: StateId) -> bool {
        self.active
            .iter()
            .any(|leaf| self.is_self_or_ancestor(*leaf, id))
    }

    /// Human-readable names of every currently active state, in tree order.
    pub fn active_state_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(root) = self.root {
            self.collect_active_names(root, &mut names);
        }
        names
    }

    fn collect_active_names(&self, id: StateId, names: &mut Vec<String>) {
        if !self.is_active(id) {
            return;
        }
        names.push(self.states[id.0].name.clone());
        for child in &self.states[id.0].children {
            self.collect_active_names(*child, names);
        }
    }

    /// Walks from `leaf` up to the root, checking for `ancestor`.
    fn is_self_or_ancestor(&self, leaf: StateId, ancestor: StateId) -> bool {
        let mut current = Some(leaf);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.states[id.0].parent;
        }
        false
    }

    fn depth(&self, id: StateId) -> usize {
        let mut depth = 0;
        let mut current = self.states[id.0].parent;
        while let Some(id) = current {
            depth += 1;
            current = self.states[id.0].parent;
        }
        depth
    }

    /// Active leaves plus all their ancestors, ordered most deeply nested
    /// first. Ties break on arena order for determinism.
    fn active_states_deepest_first(&self) -> Vec<StateId> {
        let mut set = alloc::collections::BTreeSet::new();
        for leaf in &self.active {
            let mut current = Some(*leaf);
            while let Some(id) = current {
                set.insert(id);
                current = self.states[id.0].parent;
            }
        }
        let mut ordered: Vec<StateId> = set.into_iter().collect();
        ordered.sort_by(|a, b| self.depth(*b).cmp(&self.depth(*a)).then(a.0.cmp(&b.0)));
        ordered
    }

    /// Deactivates the source's leaf chain and activates the target's.
    fn take_transition(&mut self, source: StateId, target: StateId) -> Result<(), EngineError> {
        if target.0 >= self.states.len() {
            return Err(EngineError::UnknownState);
        }
        let remaining: Vec<StateId> = self
            .active
            .iter()
            .copied()
            .filter(|leaf| !self.is_self_or_ancestor(*leaf, source))
            .collect();
        self.active = remaining;
        self.enter(target)
    }

    /// Recursively activates `id`: `Exclusive` composites descend into their
    /// initial child, `Parallel` composites start every child, leaves join
    /// the active configuration. Entering a `Final` leaf queues its parent
    /// composite for completion processing.
    fn enter(&mut self, id: StateId) -> Result<(), EngineError> {
        match self.states[id.0].kind {
            StateKind::Simple => {
                self.active.push(id);
                Ok(())
            }
            StateKind::Final => {
                self.active.push(id);
                if let Some(parent) = self.states[id.0].parent {
                    trace!(
                        "[SM] region '{}' finished",
                        self.states[parent.0].name
                    );
                    self.pending_completions.push_back(parent);
                }
                Ok(())
            }
            StateKind::Exclusive => {
                let Some(initial) = self.states[id.0].initial else {
                    error!(
                        "[SM] Exclusive state '{}' entered without initial child",
                        self.states[id.0].name
                    );
                    return Err(EngineError::MissingInitialChild {
                        state: self.states[id.0].name.clone(),
                    });
                };
                self.enter(initial)
            }
            StateKind::Parallel => {
                let children = self.states[id.0].children.clone();
                for child in children {
                    self.enter(child)?;
                }
                Ok(())
            }
        }
    }

    /// Fires `RegionFinished` transitions defined on composites whose
    /// `Final` child was reached, cascading until quiescent.
    fn run_completions(&mut self, outbox: &mut Outbox) -> Result<(), EngineError> {
        while let Some(region) = self.pending_completions.pop_front() {
            if !self.is_active(region) {
                continue;
            }
            let Some(idx) = self.states[region.0]
                .transitions
                .iter()
                .position(|t| t.event == EventKind::RegionFinished)
            else {
                continue;
            };
            let event = Event::RegionFinished;
            let (taken, target) = {
                let transition = &mut self.states[region.0].transitions[idx];
                let target = transition.target;
                let taken = match transition.guard.as_mut() {
                    Some(guard) => guard(outbox, &event),
                    None => true,
                };
                (taken, target)
            };
            if taken {
                if let Some(target) = target {
                    debug!(
                        "[SM] region '{}' complete -> '{}'",
                        self.states[region.0].name,
                        self.states[target.0].name
                    );
                    self.take_transition(region, target)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
