use super::FunctionModule;
use crate::event::Event;
use crate::types::{InstanceId, ReturnCode};
use alloc::collections::VecDeque;
use log::debug;

/// Test double for one function-module endpoint.
///
/// Owned by the test harness (or a transport adapter under test) and shared
/// by reference with every sub-machine driving that channel. A single
/// "fail next request" flag is consulted and cleared by every request method;
/// when set, the request is rejected synchronously and no acknowledgment is
/// queued. Read-type requests additionally queue their acknowledgment event,
/// which the harness feeds back into the device under test.
pub struct MockFunctionModule {
    instance: InstanceId,
    fail_next: bool,
    /// Tag uid answered by `req_uid`.
    pub uid: u32,
    /// Data word answered by `req_user_data`.
    pub user_data: u32,
    /// Value answered by `req_act_input_value`.
    pub input_value: u16,
    acknowledgements: VecDeque<Event>,
}

impl MockFunctionModule {
    pub fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            fail_next: false,
            uid: 0,
            user_data: 0,
            input_value: 0,
            acknowledgements: VecDeque::new(),
        }
    }

    /// Test control: rejects the next request with `Failed`.
    pub fn fail_next_request(&mut self) {
        self.fail_next = true;
    }

    /// Drains the acknowledgments queued by read-type requests.
    pub fn take_acknowledgements(&mut self) -> VecDeque<Event> {
        core::mem::take(&mut self.acknowledgements)
    }

    /// Consults and clears the fault-injection flag.
    fn immediate_status(&mut self, request: &str) -> ReturnCode {
        if self.fail_next {
            self.fail_next = false;
            debug!("[{}] {request}: injected failure", self.instance);
            ReturnCode::Failed
        } else {
            debug!("[{}] {request}: accepted", self.instance);
            ReturnCode::Ok
        }
    }
}

impl FunctionModule for MockFunctionModule {
    fn set_motor_state(&mut self, _enable: bool) -> ReturnCode {
        self.immediate_status("set_motor_state")
    }

    fn exec_reference_movement(&mut self) -> ReturnCode {
        self.immediate_status("exec_reference_movement")
    }

    fn set_output_value(&mut self, _value: u16) -> ReturnCode {
        self.immediate_status("set_output_value")
    }

    fn set_state(&mut self, _enable: bool, _channel: u8) -> ReturnCode {
        self.immediate_status("set_state")
    }

    fn set_login(&mut self, _password: u32) -> ReturnCode {
        self.immediate_status("set_login")
    }

    fn req_uid(&mut self) -> ReturnCode {
        let status = self.immediate_status("req_uid");
        if status.is_ok() {
            self.acknowledgements.push_back(Event::ReportUid {
                instance: self.instance,
                status: ReturnCode::Ok,
                uid: self.uid,
            });
        }
        status
    }

    fn req_user_data(&mut self, address: u8) -> ReturnCode {
        let status = self.immediate_status("req_user_data");
        if status.is_ok() {
            self.acknowledgements.push_back(Event::ReportUserData {
                instance: self.instance,
                status: ReturnCode::Ok,
                address,
                data: self.user_data,
            });
        }
        status
    }

    fn req_act_input_value(&mut self) -> ReturnCode {
        let status = self.immediate_status("req_act_input_value");
        if status.is_ok() {
            self.acknowledgements.push_back(Event::ReportDigInputValue {
                instance: self.instance,
                status: ReturnCode::Ok,
                value: self.input_value,
            });
        }
        status
    }
}
