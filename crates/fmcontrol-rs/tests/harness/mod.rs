// crates/fmcontrol-rs/tests/harness/mod.rs
//
// Shared bench for device integration tests: owns the mock function-module
// endpoints and pumps their queued acknowledgments back into the device under
// test until the conversation quiesces.

use fmcontrol_rs::{Event, InstanceId, LogicalDevice, MockFunctionModule, ReturnCode};

use std::cell::RefCell;
use std::rc::Rc;

pub type SharedMock = Rc<RefCell<MockFunctionModule>>;

pub fn endpoint(instance: u8) -> SharedMock {
    Rc::new(RefCell::new(MockFunctionModule::new(InstanceId(instance))))
}

/// Initializes test logging once per process; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A device under test plus every mock endpoint wired into it.
pub struct Bench<D: LogicalDevice> {
    pub device: D,
    endpoints: Vec<SharedMock>,
}

impl<D: LogicalDevice> Bench<D> {
    pub fn new(device: D, endpoints: Vec<SharedMock>) -> Self {
        Self { device, endpoints }
    }

    /// Feeds one request and then pumps mock acknowledgments to quiescence.
    pub fn submit(&mut self, event: Event) {
        self.device.raise(event);
        self.pump();
    }

    /// Delivers every acknowledgment the mocks have queued, repeating until
    /// no endpoint has anything pending. Only read-type requests are
    /// auto-acknowledged by the mocks; write-type acknowledgments are fed
    /// explicitly by the test via [`Bench::ack`].
    pub fn pump(&mut self) {
        loop {
            let mut acks = Vec::new();
            for endpoint in &self.endpoints {
                acks.extend(endpoint.borrow_mut().take_acknowledgements());
            }
            if acks.is_empty() {
                return;
            }
            for ack in acks {
                self.device.raise(ack);
            }
        }
    }

    /// Feeds one explicit acknowledgment, then pumps.
    pub fn ack(&mut self, event: Event) {
        self.device.raise(event);
        self.pump();
    }

    pub fn responses(&mut self) -> Vec<Event> {
        self.device.take_responses()
    }

    pub fn assert_in(&self, name: &str) {
        let names = self.device.active_state_names();
        assert!(
            names.iter().any(|n| n == name),
            "expected active state {name:?}, got {names:?}"
        );
    }
}

// --- Acknowledgment constructors for write-type requests ---

pub fn set_state_ack(instance: u8, status: ReturnCode) -> Event {
    Event::ReportSetStateAckn {
        instance: InstanceId(instance),
        status,
    }
}

pub fn reference_ack(instance: u8, status: ReturnCode, position: i32) -> Event {
    Event::ReportReferenceMovementAckn {
        instance: InstanceId(instance),
        status,
        position,
    }
}

pub fn output_ack(instance: u8, status: ReturnCode) -> Event {
    Event::ReportActOutputValue {
        instance: InstanceId(instance),
        status,
        value: 0,
    }
}

pub fn login_ack(instance: u8, status: ReturnCode) -> Event {
    Event::ReportLoginAckn {
        instance: InstanceId(instance),
        status,
    }
}
