use super::{Device, LogicalDevice};
use crate::engine::StateKind;
use crate::event::{Event, EventKind};
use crate::fm::SharedFm;
use crate::sequence::LedSequence;
use crate::types::{HoodState, C_LED_OUTPUT_OFF, C_LED_OUTPUT_ON};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Function-module endpoints of the hood assembly.
pub struct HoodFunctionModules {
    /// Digital input carrying the open/closed switch.
    pub input: SharedFm,
    /// Green status LED output channel.
    pub led_green: SharedFm,
    /// Red status LED output channel.
    pub led_red: SharedFm,
}

/// Hood assembly: an open/closed switch and the status LEDs.
///
/// `Initializing` only drives the LEDs to the ready pattern. `Working` holds a
/// single region that samples the switch on demand; a status read never fails
/// the request outright, the state is reported as [`HoodState::Unknown`]
/// instead.
pub struct Hood {
    device: Device,
}

impl Hood {
    pub fn new(fms: HoodFunctionModules) -> Self {
        let mut device = Device::new("Hood");
        device.noop_configuring_chain();

        let ready_leds = LedSequence::new(
            fms.led_green,
            fms.led_red,
            C_LED_OUTPUT_ON,
            C_LED_OUTPUT_OFF,
        );
        let initializing = device.lifecycle.initializing;
        let init_done = device
            .machine
            .add_state("InitDone", StateKind::Final, Some(initializing));
        let entry = ready_leds.install(&mut device.machine, initializing, init_done, "Init", None);
        device.machine.set_initial(initializing, entry);
        device.forward_init_led_errors();

        let led_kick = ready_leds.clone();
        device.connect_initialize(Box::new(move |outbox, _| {
            led_kick.kick(outbox);
            true
        }));

        // Working: one region polling the hood switch on demand.
        let working = device.lifecycle.working;
        let region = device
            .machine
            .add_state("HoodStatus", StateKind::Exclusive, Some(working));
        let idle = device
            .machine
            .add_state("StatusIdle", StateKind::Simple, Some(region));
        let reading = device
            .machine
            .add_state("StatusReading", StateKind::Simple, Some(region));
        device.machine.set_initial(region, idle);

        let input = fms.input.clone();
        device.machine.add_transition(
            idle,
            EventKind::ReadHoodStatus,
            Some(reading),
            Some(Box::new(move |outbox, _| {
                let code = input.borrow_mut().req_act_input_value();
                if !code.is_ok() {
                    outbox.emit(Event::ReportHoodStatus {
                        state: HoodState::Unknown,
                    });
                    return false;
                }
                true
            })),
        );
        device.machine.add_transition(
            reading,
            EventKind::ReportDigInputValue,
            Some(idle),
            Some(Box::new(move |outbox, event| {
                let Event::ReportDigInputValue { status, value, .. } = event else {
                    return false;
                };
                let state = if !status.is_ok() {
                    HoodState::Unknown
                } else if *value != 0 {
                    HoodState::Closed
                } else {
                    HoodState::Open
                };
                outbox.emit(Event::ReportHoodStatus { state });
                true
            })),
        );

        // Overlapping reads and reads before Working never hang the caller.
        device.install_nack(region, EventKind::ReadHoodStatus, |_| {
            Event::ReportHoodStatus {
                state: HoodState::Unknown,
            }
        });
        let init = device.lifecycle.init;
        device.install_nack(init, EventKind::ReadHoodStatus, |_| {
            Event::ReportHoodStatus {
                state: HoodState::Unknown,
            }
        });

        device.start_machine();
        Self { device }
    }
}

impl LogicalDevice for Hood {
    fn raise(&mut self, event: Event) {
        self.device.raise(event);
    }

    fn poll_response(&mut self) -> Option<Event> {
        self.device.poll_response()
    }

    fn take_responses(&mut self) -> Vec<Event> {
        self.device.take_responses()
    }

    fn active_state_names(&self) -> Vec<String> {
        self.device.active_state_names()
    }

    fn is_degraded(&self) -> bool {
        self.device.is_degraded()
    }
}
