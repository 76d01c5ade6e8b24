use super::ChainAction;
use crate::engine::{Outbox, StateId, StateKind, StateMachine};
use crate::event::{Event, EventKind};
use crate::fm::SharedFm;
use alloc::boxed::Box;

/// Stepper-motor homing sequence.
///
/// `MotorSetState --set-state ack--> MotorReferenceRun --reference ack-->
/// next`. The kick energizes the driver and requests the endpoint state;
/// each acknowledgment guard checks the preceding step's status and issues
/// the next request. Any non-success status short-circuits by raising
/// `NeedInitialize(code)` without a state change, letting the enclosing
/// `Initializing` composite forward the failure.
#[derive(Clone)]
pub struct StepperInit {
    motor: SharedFm,
    channel: u8,
}

impl StepperInit {
    pub fn new(motor: SharedFm, channel: u8) -> Self {
        Self { motor, channel }
    }

    /// Issues the first request of the homing conversation.
    pub fn kick(&self, outbox: &mut Outbox) {
        let mut motor = self.motor.borrow_mut();
        let code = motor.set_motor_state(true);
        if !code.is_ok() {
            outbox.raise(Event::NeedInitialize { code });
            return;
        }
        let code = motor.set_state(true, self.channel);
        if !code.is_ok() {
            outbox.raise(Event::NeedInitialize { code });
        }
    }

    /// Grafts the chain under `parent`, ending in a transition to `next`.
    /// Returns the entry state. `on_next` runs after the reference movement
    /// completed successfully, so the next sub-machine can issue its first
    /// request.
    pub fn install(
        &self,
        machine: &mut StateMachine,
        parent: StateId,
        next: StateId,
        mut on_next: Option<ChainAction>,
    ) -> StateId {
        let set_state_wait = machine.add_state("MotorSetState", StateKind::Simple, Some(parent));
        let reference_wait =
            machine.add_state("MotorReferenceRun", StateKind::Simple, Some(parent));

        let seq = self.clone();
        machine.add_transition(
            set_state_wait,
            EventKind::ReportSetStateAckn,
            Some(reference_wait),
            Some(Box::new(move |outbox, event| {
                let Event::ReportSetStateAckn { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::NeedInitialize { code: *status });
                    return false;
                }
                let code = seq.motor.borrow_mut().exec_reference_movement();
                if !code.is_ok() {
                    outbox.raise(Event::NeedInitialize { code });
                    return false;
                }
                true
            })),
        );

        machine.add_transition(
            reference_wait,
            EventKind::ReportReferenceMovementAckn,
            Some(next),
            Some(Box::new(move |outbox, event| {
                let Event::ReportReferenceMovementAckn { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::NeedInitialize { code: *status });
                    return false;
                }
                if let Some(action) = on_next.as_mut() {
                    action(outbox);
                }
                true
            })),
        );

        set_state_wait
    }
}
