//! Root lifecycle machine shared by every physical assembly.
//!
//! A [`Device`] owns one state-machine instance with the universal lifecycle
//! tree and the default-rejection transitions that guarantee every request is
//! answered. Concrete assemblies ([`Drawer`], [`Hood`]) graft their hardware
//! sub-machines into the `Configuring`/`Initializing`/`Working` composites.

pub mod drawer;
pub mod hood;

pub use drawer::{Drawer, DrawerFunctionModules};
pub use hood::{Hood, HoodFunctionModules};

use crate::engine::{EngineError, Guard, Outbox, StateId, StateKind, StateMachine};
use crate::event::{Event, EventKind};
use crate::types::ReturnCode;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, error, info, warn};

/// Common request/response surface of every device assembly.
///
/// Used by test harnesses and the task layer above to drive heterogeneous
/// devices uniformly.
pub trait LogicalDevice {
    /// Feeds one request or acknowledgment event into the device.
    fn raise(&mut self, event: Event);
    /// Removes and returns the oldest pending response, if any.
    fn poll_response(&mut self) -> Option<Event>;
    /// Drains all pending responses.
    fn take_responses(&mut self) -> Vec<Event>;
    /// Names of every currently active state, for tests and diagnostics.
    fn active_state_names(&self) -> Vec<String>;
    /// Whether the instance hit an engine-internal fault.
    fn is_degraded(&self) -> bool;
}

/// Handles of the well-known lifecycle states.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    pub all: StateId,
    pub init: StateId,
    pub start: StateId,
    pub configuring: StateId,
    pub configured: StateId,
    pub initializing: StateId,
    pub working: StateId,
    pub machine_error: StateId,
}

/// Root state machine of one physical assembly.
///
/// Lifecycle: created in `Start`; `Configure` moves to `Configuring`, whose
/// internal chain reaching `Final` auto-advances to `Configured`;
/// `Initialize` (only from `Configured`) moves to `Initializing`, which
/// either completes into `Working` or falls back to `Configured` on
/// `NeedInitialize`. `MachineError` is terminal for the instance and is
/// entered only on an engine-internal consistency fault.
pub struct Device {
    name: &'static str,
    pub(crate) machine: StateMachine,
    pub(crate) outbox: Outbox,
    pub(crate) lifecycle: Lifecycle,
    degraded: bool,
}

impl Device {
    /// Builds the lifecycle skeleton with its universal transitions and the
    /// root-level default-rejection transitions for `Configure` and
    /// `Initialize`.
    pub(crate) fn new(name: &'static str) -> Self {
        info!("[{name}] creating device");
        let mut machine = StateMachine::new();
        let all = machine.add_state("All", StateKind::Exclusive, None);
        let init = machine.add_state("Init", StateKind::Exclusive, Some(all));
        let machine_error = machine.add_state("MachineError", StateKind::Simple, Some(all));
        let start = machine.add_state("Start", StateKind::Simple, Some(init));
        let configuring = machine.add_state("Configuring", StateKind::Exclusive, Some(init));
        let configured = machine.add_state("Configured", StateKind::Simple, Some(init));
        let initializing = machine.add_state("Initializing", StateKind::Exclusive, Some(init));
        let working = machine.add_state("Working", StateKind::Parallel, Some(init));
        machine.set_initial(all, init);
        machine.set_initial(init, start);

        let lifecycle = Lifecycle {
            all,
            init,
            start,
            configuring,
            configured,
            initializing,
            working,
            machine_error,
        };

        machine.add_transition(start, EventKind::Configure, Some(configuring), None);
        machine.add_transition(
            configuring,
            EventKind::RegionFinished,
            Some(configured),
            Some(Box::new(move |outbox, _| {
                outbox.emit(Event::ReportConfigure {
                    status: ReturnCode::Ok,
                });
                true
            })),
        );
        machine.add_transition(
            initializing,
            EventKind::RegionFinished,
            Some(working),
            Some(Box::new(move |outbox, _| {
                outbox.emit(Event::ReportInitialize {
                    status: ReturnCode::Ok,
                });
                true
            })),
        );
        machine.add_transition(
            initializing,
            EventKind::NeedInitialize,
            Some(configured),
            Some(Box::new(move |outbox, event| {
                let Event::NeedInitialize { code } = event else {
                    return false;
                };
                outbox.emit(Event::ReportInitialize { status: *code });
                true
            })),
        );

        let mut device = Self {
            name,
            machine,
            outbox: Outbox::new(),
            lifecycle,
            degraded: false,
        };
        // Wrong-state requests are answered, never silently dropped.
        device.install_nack(all, EventKind::Configure, |_| Event::ReportConfigure {
            status: ReturnCode::InvalidState,
        });
        device.install_nack(all, EventKind::Initialize, |_| Event::ReportInitialize {
            status: ReturnCode::InvalidState,
        });
        device
    }

    /// Installs a default-rejection transition on `state`: an internal
    /// transition that answers the request with a deterministic negative
    /// response built by `respond`.
    pub(crate) fn install_nack(
        &mut self,
        state: StateId,
        kind: EventKind,
        mut respond: impl FnMut(&Event) -> Event + 'static,
    ) {
        let name = self.name;
        self.machine.add_transition(
            state,
            kind,
            None,
            Some(Box::new(move |outbox, event| {
                warn!("[{name}] rejecting {:?} in current state", event.kind());
                outbox.emit(respond(event));
                true
            })),
        );
    }

    /// Installs `Configured --Initialize--> Initializing` with the concrete
    /// device's kick action, which must issue the first hardware request of
    /// the initialization chain.
    pub(crate) fn connect_initialize(&mut self, kick: Guard) {
        let lifecycle = self.lifecycle;
        self.machine.add_transition(
            lifecycle.configured,
            EventKind::Initialize,
            Some(lifecycle.initializing),
            Some(kick),
        );
    }

    /// Gives `Configuring` an immediately-final chain for devices without
    /// configuration hardware.
    pub(crate) fn noop_configuring_chain(&mut self) {
        let configuring = self.lifecycle.configuring;
        let done = self
            .machine
            .add_state("ConfigDone", StateKind::Final, Some(configuring));
        self.machine.set_initial(configuring, done);
    }

    /// Forwards LED-sequence failures inside `Initializing` to the device's
    /// own `NeedInitialize` fallback.
    pub(crate) fn forward_init_led_errors(&mut self) {
        self.machine.add_transition(
            self.lifecycle.initializing,
            EventKind::LedError,
            None,
            Some(Box::new(move |outbox, event| {
                let Event::LedError { code } = event else {
                    return false;
                };
                outbox.raise(Event::NeedInitialize { code: *code });
                true
            })),
        );
    }

    /// Enters the initial configuration (`Start`).
    pub(crate) fn start_machine(&mut self) {
        if let Err(err) = self.machine.start(&mut self.outbox) {
            self.enter_machine_error(err);
        }
    }

    /// Feeds one event into the machine and runs the event loop to
    /// completion: events raised by guards are delivered in arrival order on
    /// subsequent turns, never reentrantly.
    pub fn raise(&mut self, event: Event) {
        if event.is_request() {
            info!("[{}] request {:?}", self.name, event.kind());
        } else {
            debug!("[{}] raise {:?}", self.name, event.kind());
        }
        let mut queue = VecDeque::new();
        queue.push_back(event);
        while let Some(event) = queue.pop_front() {
            let result = self.machine.dispatch(&mut self.outbox, &event);
            while let Some(raised) = self.outbox.pop_raised() {
                queue.push_back(raised);
            }
            if let Err(err) = result {
                self.enter_machine_error(err);
                return;
            }
        }
    }

    /// Removes and returns the oldest pending response, if any.
    pub fn poll_response(&mut self) -> Option<Event> {
        self.outbox.pop_response()
    }

    /// Drains all pending responses.
    pub fn take_responses(&mut self) -> Vec<Event> {
        let mut responses = Vec::with_capacity(self.outbox.response_count());
        while let Some(event) = self.outbox.pop_response() {
            responses.push(event);
        }
        responses
    }

    /// Names of every currently active state, for tests and diagnostics.
    pub fn active_state_names(&self) -> Vec<String> {
        self.machine.active_state_names()
    }

    /// Whether this instance hit an engine-internal fault and is parked in
    /// `MachineError`.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Diagnostic hook for engine-internal consistency faults. The instance
    /// is marked degraded and parked in `MachineError`; event dispatching
    /// elsewhere in the system is unaffected.
    fn enter_machine_error(&mut self, err: EngineError) {
        error!(
            "[{}] engine fault: {err}; active states: {:?}",
            self.name,
            self.machine.active_state_names()
        );
        self.degraded = true;
        if let Err(force_err) = self.machine.force_state(self.lifecycle.machine_error) {
            error!("[{}] could not enter MachineError: {force_err}", self.name);
        }
    }
}
