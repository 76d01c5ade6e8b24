//! Function-module endpoint boundary.
//!
//! A function module (FM) is a logical hardware endpoint reachable only via
//! fire-and-forget requests and later, asynchronous acknowledgments. The
//! immediate `ReturnCode` answers "was the request even dispatchable"; the
//! hardware outcome arrives later as an acknowledgment [`Event`](crate::Event)
//! fed back into the owning device by the transport (or the test harness).

pub mod mock;

pub use mock::MockFunctionModule;

use crate::types::ReturnCode;
use alloc::rc::Rc;
use core::cell::RefCell;

/// Abstraction over one function-module endpoint.
///
/// Keeping the protocol logic behind this trait lets the core stay
/// platform-agnostic: the real transport adapter and the mock implement the
/// same surface.
pub trait FunctionModule {
    /// Enables or disables the stepper-motor driver. No acknowledgment.
    fn set_motor_state(&mut self, enable: bool) -> ReturnCode;

    /// Starts a reference movement. Acknowledged by
    /// `ReportReferenceMovementAckn`.
    fn exec_reference_movement(&mut self) -> ReturnCode;

    /// Drives an output channel to `value`. Acknowledged by
    /// `ReportActOutputValue`.
    fn set_output_value(&mut self, value: u16) -> ReturnCode;

    /// Enables or disables the endpoint on `channel`. Acknowledged by
    /// `ReportSetStateAckn`.
    fn set_state(&mut self, enable: bool, channel: u8) -> ReturnCode;

    /// Presents a login password to an RFID transponder. Acknowledged by
    /// `ReportLoginAckn`.
    fn set_login(&mut self, password: u32) -> ReturnCode;

    /// Requests the RFID tag uid. Acknowledged by `ReportUid`.
    fn req_uid(&mut self) -> ReturnCode;

    /// Requests one user-data word from the RFID tag. Acknowledged by
    /// `ReportUserData`.
    fn req_user_data(&mut self, address: u8) -> ReturnCode;

    /// Requests the current digital input value. Acknowledged by
    /// `ReportDigInputValue`.
    fn req_act_input_value(&mut self) -> ReturnCode;
}

/// Shared handle to one endpoint.
///
/// Several sub-machines may hold the same endpoint (a motion machine
/// delegating to an LED sequence, for instance), but by construction each
/// physical channel is driven by exactly one active sub-machine at a time and
/// the whole engine runs on one logical thread, so `Rc<RefCell<_>>` is
/// sufficient.
pub type SharedFm = Rc<RefCell<dyn FunctionModule>>;
