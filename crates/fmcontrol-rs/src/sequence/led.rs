use super::ChainAction;
use crate::engine::{Outbox, StateId, StateKind, StateMachine};
use crate::event::{Event, EventKind};
use crate::fm::SharedFm;
use alloc::boxed::Box;
use alloc::format;

/// Two-step LED output sequence: drive the green channel, await its
/// acknowledgment, drive the red channel, await its acknowledgment.
///
/// The target values are supplied by the constructor, so the same chain shape
/// expresses "signal ready" (green on, red off) as well as "signal blocked"
/// (green off, red on). Any acknowledgment carrying a non-success status
/// raises `LedError(code)` instead of advancing; the enclosing machine
/// decides where that error lands.
#[derive(Clone)]
pub struct LedSequence {
    green: SharedFm,
    red: SharedFm,
    green_value: u16,
    red_value: u16,
}

impl LedSequence {
    pub fn new(green: SharedFm, red: SharedFm, green_value: u16, red_value: u16) -> Self {
        Self {
            green,
            red,
            green_value,
            red_value,
        }
    }

    /// Issues the first request of the chain. A synchronously rejected
    /// request raises `LedError` so the enclosing machine converges on its
    /// error path instead of parking forever.
    pub fn kick(&self, outbox: &mut Outbox) {
        let code = self.green.borrow_mut().set_output_value(self.green_value);
        if !code.is_ok() {
            outbox.raise(Event::LedError { code });
        }
    }

    /// Grafts the chain under `parent`: `{prefix}Green --ack--> {prefix}Red
    /// --ack--> done`. Returns the entry state. `on_complete` runs after the
    /// last successful acknowledgment, before the transition to `done`.
    pub fn install(
        &self,
        machine: &mut StateMachine,
        parent: StateId,
        done: StateId,
        prefix: &str,
        mut on_complete: Option<ChainAction>,
    ) -> StateId {
        let green_wait =
            machine.add_state(&format!("{prefix}Green"), StateKind::Simple, Some(parent));
        let red_wait = machine.add_state(&format!("{prefix}Red"), StateKind::Simple, Some(parent));

        let seq = self.clone();
        machine.add_transition(
            green_wait,
            EventKind::ReportActOutputValue,
            Some(red_wait),
            Some(Box::new(move |outbox, event| {
                let Event::ReportActOutputValue { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::LedError { code: *status });
                    return false;
                }
                let code = seq.red.borrow_mut().set_output_value(seq.red_value);
                if !code.is_ok() {
                    outbox.raise(Event::LedError { code });
                    return false;
                }
                true
            })),
        );

        machine.add_transition(
            red_wait,
            EventKind::ReportActOutputValue,
            Some(done),
            Some(Box::new(move |outbox, event| {
                let Event::ReportActOutputValue { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::LedError { code: *status });
                    return false;
                }
                if let Some(action) = on_complete.as_mut() {
                    action(outbox);
                }
                true
            })),
        );

        green_wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::MockFunctionModule;
    use crate::types::{InstanceId, ReturnCode, C_LED_OUTPUT_OFF, C_LED_OUTPUT_ON};
    use alloc::rc::Rc;
    use core::cell::RefCell;

    fn ack(status: ReturnCode) -> Event {
        Event::ReportActOutputValue {
            instance: InstanceId(0),
            status,
            value: 0,
        }
    }

    fn chain() -> (StateMachine, StateId, StateId, Outbox) {
        let green = Rc::new(RefCell::new(MockFunctionModule::new(InstanceId(1))));
        let red = Rc::new(RefCell::new(MockFunctionModule::new(InstanceId(2))));
        let seq = LedSequence::new(green, red, C_LED_OUTPUT_ON, C_LED_OUTPUT_OFF);

        let mut machine = StateMachine::new();
        let root = machine.add_state("Root", StateKind::Exclusive, None);
        let done = machine.add_state("Done", StateKind::Simple, Some(root));
        let entry = seq.install(&mut machine, root, done, "Test", None);
        machine.set_initial(root, entry);

        let mut outbox = Outbox::new();
        machine.start(&mut outbox).unwrap();
        (machine, entry, done, outbox)
    }

    #[test]
    fn two_successful_acks_complete_the_chain() {
        let (mut machine, _entry, done, mut outbox) = chain();
        machine.dispatch(&mut outbox, &ack(ReturnCode::Ok)).unwrap();
        machine.dispatch(&mut outbox, &ack(ReturnCode::Ok)).unwrap();
        assert!(machine.is_active(done));
        assert_eq!(outbox.pop_raised(), None);
    }

    #[test]
    fn failing_ack_raises_led_error_without_advancing() {
        let (mut machine, entry, done, mut outbox) = chain();
        machine
            .dispatch(&mut outbox, &ack(ReturnCode::Timeout))
            .unwrap();
        assert!(machine.is_active(entry));
        assert!(!machine.is_active(done));
        assert_eq!(
            outbox.pop_raised(),
            Some(Event::LedError {
                code: ReturnCode::Timeout
            })
        );
    }
}
