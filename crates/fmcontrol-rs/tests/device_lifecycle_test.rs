// crates/fmcontrol-rs/tests/device_lifecycle_test.rs

// Import the shared bench module.
// Rust looks for `tests/harness/mod.rs` when we declare `mod harness;` here.
#[cfg(feature = "std")]
mod harness;

#[cfg(feature = "std")]
mod tests {
    use super::harness::{
        endpoint, init_logging, login_ack, output_ack, reference_ack, set_state_ack, Bench,
        SharedMock,
    };

    use fmcontrol_rs::{
        Drawer, DrawerFunctionModules, Event, Hood, HoodFunctionModules, HoodState, LogicalDevice,
        ReturnCode,
    };

    const MOTOR: u8 = 1;
    const LED_GREEN: u8 = 2;
    const LED_RED: u8 = 3;
    const RFID: u8 = 4;
    const HOOD_INPUT: u8 = 5;
    const HOOD_GREEN: u8 = 6;
    const HOOD_RED: u8 = 7;

    struct DrawerBench {
        bench: Bench<Drawer>,
        motor: SharedMock,
        rfid: SharedMock,
    }

    fn create_drawer() -> DrawerBench {
        let motor = endpoint(MOTOR);
        let led_green = endpoint(LED_GREEN);
        let led_red = endpoint(LED_RED);
        let rfid = endpoint(RFID);
        let drawer = Drawer::new(DrawerFunctionModules {
            motor: motor.clone(),
            led_green: led_green.clone(),
            led_red: led_red.clone(),
            rfid: rfid.clone(),
        });
        let bench = Bench::new(drawer, vec![motor.clone(), led_green, led_red, rfid.clone()]);
        DrawerBench { bench, motor, rfid }
    }

    fn create_hood() -> (Bench<Hood>, SharedMock) {
        let input = endpoint(HOOD_INPUT);
        let led_green = endpoint(HOOD_GREEN);
        let led_red = endpoint(HOOD_RED);
        let hood = Hood::new(HoodFunctionModules {
            input: input.clone(),
            led_green: led_green.clone(),
            led_red: led_red.clone(),
        });
        let bench = Bench::new(hood, vec![input.clone(), led_green, led_red]);
        (bench, input)
    }

    /// Drives a drawer bench through the full initialization conversation.
    fn initialize_drawer(d: &mut DrawerBench) {
        d.bench.submit(Event::Configure);
        d.bench.submit(Event::Initialize);
        d.bench.ack(set_state_ack(MOTOR, ReturnCode::Ok));
        d.bench.ack(reference_ack(MOTOR, ReturnCode::Ok, 0));
        d.bench.ack(output_ack(LED_GREEN, ReturnCode::Ok));
        d.bench.ack(output_ack(LED_RED, ReturnCode::Ok));
        d.bench.responses();
    }

    #[test]
    fn drawer_boots_to_working_through_full_conversation() {
        init_logging();
        let mut d = create_drawer();

        d.bench.submit(Event::Configure);
        assert_eq!(
            d.bench.responses(),
            [Event::ReportConfigure {
                status: ReturnCode::Ok
            }]
        );

        d.bench.submit(Event::Initialize);
        d.bench.assert_in("MotorSetState");
        d.bench.ack(set_state_ack(MOTOR, ReturnCode::Ok));
        d.bench.assert_in("MotorReferenceRun");
        d.bench.ack(reference_ack(MOTOR, ReturnCode::Ok, 4200));
        d.bench.assert_in("InitGreen");
        d.bench.ack(output_ack(LED_GREEN, ReturnCode::Ok));
        d.bench.ack(output_ack(LED_RED, ReturnCode::Ok));

        assert_eq!(
            d.bench.responses(),
            [Event::ReportInitialize {
                status: ReturnCode::Ok
            }]
        );
        d.bench.assert_in("Working");
        d.bench.assert_in("RfidIdle");
        d.bench.assert_in("MotionClosed");
    }

    #[test]
    fn rack_rfid_read_reports_tag_contents() {
        init_logging();
        let mut d = create_drawer();
        initialize_drawer(&mut d);
        d.rfid.borrow_mut().uid = 0x00C0_FFEE;
        d.rfid.borrow_mut().user_data = 42;

        d.bench.submit(Event::ReadRackRfid { channel: 2 });
        d.bench.ack(set_state_ack(RFID, ReturnCode::Ok));
        // Login ack unlocks the two read requests, which the mocks answer on
        // their own and the bench pumps through.
        d.bench.ack(login_ack(RFID, ReturnCode::Ok));

        assert_eq!(
            d.bench.responses(),
            [Event::ReportReadRackRfid {
                status: ReturnCode::Ok,
                channel: 2,
                uid: 0x00C0_FFEE,
                data: 42,
            }]
        );
        d.bench.assert_in("RfidIdle");
    }

    #[test]
    fn every_request_is_answered_exactly_once() {
        init_logging();
        let mut d = create_drawer();

        // Four requests, deliberately including wrong-state and failing ones.
        d.bench.submit(Event::Configure);
        d.bench.submit(Event::Block);
        d.bench.submit(Event::Initialize);
        d.bench.ack(set_state_ack(MOTOR, ReturnCode::Timeout));
        d.bench.submit(Event::ReadRackRfid { channel: 1 });

        assert_eq!(
            d.bench.responses(),
            [
                Event::ReportConfigure {
                    status: ReturnCode::Ok
                },
                Event::ReportBlock {
                    status: ReturnCode::InvalidState
                },
                Event::ReportInitialize {
                    status: ReturnCode::Timeout
                },
                Event::ReportReadRackRfid {
                    status: ReturnCode::InvalidState,
                    channel: 1,
                    uid: 0,
                    data: 0,
                },
            ]
        );
    }

    #[test]
    fn failed_initialization_returns_to_configured_and_recovers() {
        init_logging();
        let mut d = create_drawer();
        d.bench.submit(Event::Configure);
        d.bench.responses();

        // First attempt dies on the reference movement.
        d.bench.submit(Event::Initialize);
        d.bench.ack(set_state_ack(MOTOR, ReturnCode::Ok));
        d.bench
            .ack(reference_ack(MOTOR, ReturnCode::CommunicationError, 0));
        assert_eq!(
            d.bench.responses(),
            [Event::ReportInitialize {
                status: ReturnCode::CommunicationError
            }]
        );
        d.bench.assert_in("Configured");

        // Second attempt succeeds end to end.
        d.bench.submit(Event::Initialize);
        d.bench.ack(set_state_ack(MOTOR, ReturnCode::Ok));
        d.bench.ack(reference_ack(MOTOR, ReturnCode::Ok, 0));
        d.bench.ack(output_ack(LED_GREEN, ReturnCode::Ok));
        d.bench.ack(output_ack(LED_RED, ReturnCode::Ok));
        assert_eq!(
            d.bench.responses(),
            [Event::ReportInitialize {
                status: ReturnCode::Ok
            }]
        );
        d.bench.assert_in("Working");
    }

    #[test]
    fn motion_and_rfid_regions_operate_independently() {
        init_logging();
        let mut d = create_drawer();
        initialize_drawer(&mut d);

        // Park the tag read in its first wait state.
        d.bench.submit(Event::ReadRackRfid { channel: 3 });
        d.bench.assert_in("RfidSetState");

        // Block the drawer while the read is still in flight.
        d.bench.submit(Event::Block);
        d.bench.ack(output_ack(LED_GREEN, ReturnCode::Ok));
        d.bench.ack(output_ack(LED_RED, ReturnCode::Ok));
        assert_eq!(
            d.bench.responses(),
            [Event::ReportBlock {
                status: ReturnCode::Ok
            }]
        );
        d.bench.assert_in("MotionBlocked");
        d.bench.assert_in("RfidSetState");

        // The parked read still completes afterwards.
        d.rfid.borrow_mut().uid = 7;
        d.bench.ack(set_state_ack(RFID, ReturnCode::Ok));
        d.bench.ack(login_ack(RFID, ReturnCode::Ok));
        assert_eq!(
            d.bench.responses(),
            [Event::ReportReadRackRfid {
                status: ReturnCode::Ok,
                channel: 3,
                uid: 7,
                data: 0,
            }]
        );
    }

    #[test]
    fn wrong_state_requests_on_fresh_device_are_all_rejected_alike() {
        init_logging();
        let mut d = create_drawer();

        for _ in 0..2 {
            d.bench.submit(Event::Block);
            assert_eq!(
                d.bench.responses(),
                [Event::ReportBlock {
                    status: ReturnCode::InvalidState
                }]
            );
            d.bench.submit(Event::Unblock);
            assert_eq!(
                d.bench.responses(),
                [Event::ReportUnblock {
                    status: ReturnCode::InvalidState
                }]
            );
            d.bench.assert_in("Start");
        }
        assert!(!d.bench.device.is_degraded());
    }

    #[test]
    fn rejected_kick_still_answers_and_leaves_device_recoverable() {
        init_logging();
        let mut d = create_drawer();
        d.bench.submit(Event::Configure);
        d.bench.responses();

        d.motor.borrow_mut().fail_next_request();
        d.bench.submit(Event::Initialize);
        assert_eq!(
            d.bench.responses(),
            [Event::ReportInitialize {
                status: ReturnCode::Failed
            }]
        );
        d.bench.assert_in("Configured");

        d.bench.submit(Event::Initialize);
        d.bench.assert_in("MotorSetState");
    }

    #[test]
    fn hood_reports_switch_state_after_initialization() {
        init_logging();
        let (mut bench, input) = create_hood();

        bench.submit(Event::Configure);
        bench.submit(Event::Initialize);
        bench.ack(output_ack(HOOD_GREEN, ReturnCode::Ok));
        bench.ack(output_ack(HOOD_RED, ReturnCode::Ok));
        bench.responses();
        bench.assert_in("StatusIdle");

        bench.submit(Event::ReadHoodStatus);
        assert_eq!(
            bench.responses(),
            [Event::ReportHoodStatus {
                state: HoodState::Open
            }]
        );

        input.borrow_mut().input_value = 1;
        bench.submit(Event::ReadHoodStatus);
        assert_eq!(
            bench.responses(),
            [Event::ReportHoodStatus {
                state: HoodState::Closed
            }]
        );
    }

    #[test]
    fn hood_status_before_working_is_unknown() {
        init_logging();
        let (mut bench, _input) = create_hood();

        bench.submit(Event::ReadHoodStatus);
        assert_eq!(
            bench.responses(),
            [Event::ReportHoodStatus {
                state: HoodState::Unknown
            }]
        );
        bench.assert_in("Start");
    }
}
