use super::{Device, LogicalDevice};
use crate::engine::StateKind;
use crate::event::{Event, EventKind};
use crate::fm::SharedFm;
use crate::sequence::{LedSequence, MotionBlock, RfidRead, StepperInit};
use crate::types::{
    ReturnCode, C_LED_OUTPUT_OFF, C_LED_OUTPUT_ON, C_RFID_DEFAULT_ADDRESS,
    C_RFID_DEFAULT_PASSWORD,
};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Function-module endpoints of one drawer assembly.
pub struct DrawerFunctionModules {
    /// Stepper motor driving the drawer.
    pub motor: SharedFm,
    /// Green status LED output channel.
    pub led_green: SharedFm,
    /// Red status LED output channel.
    pub led_red: SharedFm,
    /// RFID reader for the rack tag.
    pub rfid: SharedFm,
}

/// Drawer assembly: stepper motion, status LEDs and a rack RFID reader.
///
/// `Initializing` homes the stepper and then drives the LEDs to the ready
/// pattern. `Working` runs two parallel regions: the rack tag reader and the
/// motion block machine, each independently operable.
pub struct Drawer {
    device: Device,
}

impl Drawer {
    /// Motor endpoint channel used for the homing conversation.
    const MOTOR_CHANNEL: u8 = 0;

    pub fn new(fms: DrawerFunctionModules) -> Self {
        let mut device = Device::new("Drawer");
        device.noop_configuring_chain();

        // Initializing: home the stepper, then signal ready on the LEDs.
        let stepper = StepperInit::new(fms.motor.clone(), Self::MOTOR_CHANNEL);
        let ready_leds = LedSequence::new(
            fms.led_green.clone(),
            fms.led_red.clone(),
            C_LED_OUTPUT_ON,
            C_LED_OUTPUT_OFF,
        );
        let initializing = device.lifecycle.initializing;
        let init_done = device
            .machine
            .add_state("InitDone", StateKind::Final, Some(initializing));
        let led_entry = ready_leds.install(&mut device.machine, initializing, init_done, "Init", None);
        let led_kick = ready_leds.clone();
        let stepper_entry = stepper.install(
            &mut device.machine,
            initializing,
            led_entry,
            Some(Box::new(move |outbox| led_kick.kick(outbox))),
        );
        device.machine.set_initial(initializing, stepper_entry);
        device.forward_init_led_errors();

        let stepper_kick = stepper.clone();
        device.connect_initialize(Box::new(move |outbox, _| {
            stepper_kick.kick(outbox);
            true
        }));

        // Working: rack tag reading and motion blocking run concurrently.
        let working = device.lifecycle.working;
        let rfid_region = device
            .machine
            .add_state("RfidRead", StateKind::Exclusive, Some(working));
        RfidRead::new(
            fms.rfid.clone(),
            C_RFID_DEFAULT_PASSWORD,
            C_RFID_DEFAULT_ADDRESS,
        )
        .install(&mut device, rfid_region);

        let motion_region = device
            .machine
            .add_state("Motion", StateKind::Exclusive, Some(working));
        let block_leds = LedSequence::new(
            fms.led_green.clone(),
            fms.led_red.clone(),
            C_LED_OUTPUT_OFF,
            C_LED_OUTPUT_ON,
        );
        let unblock_leds = LedSequence::new(
            fms.led_green,
            fms.led_red,
            C_LED_OUTPUT_ON,
            C_LED_OUTPUT_OFF,
        );
        MotionBlock::new(block_leds, unblock_leds).install(&mut device, motion_region);

        // Requests arriving before Working are answered negatively.
        let init = device.lifecycle.init;
        device.install_nack(init, EventKind::ReadRackRfid, |event| {
            let channel = match event {
                Event::ReadRackRfid { channel } => *channel,
                _ => 0,
            };
            Event::ReportReadRackRfid {
                status: ReturnCode::InvalidState,
                channel,
                uid: 0,
                data: 0,
            }
        });
        device.install_nack(init, EventKind::Block, |_| Event::ReportBlock {
            status: ReturnCode::InvalidState,
        });
        device.install_nack(init, EventKind::Unblock, |_| Event::ReportUnblock {
            status: ReturnCode::InvalidState,
        });

        device.start_machine();
        Self { device }
    }
}

impl LogicalDevice for Drawer {
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
