use crate::types::{HoodState, InstanceId, ReturnCode};

/// All notifications a device state machine can observe.
///
/// Events are the only way a machine learns about the outside world: external
/// callers raise request events, function modules raise acknowledgment events,
/// and guards raise internal events for delivery on a later run-to-completion
/// turn. Each variant carries its payload as typed fields, so a missing or
/// wrongly-typed field is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // --- External Requests ---
    /// Request to configure the device. Accepted only in `Start`.
    Configure,
    /// Request to initialize the device hardware. Accepted only in `Configured`.
    Initialize,
    /// Request to read the rack RFID tag on the given reader channel.
    ReadRackRfid { channel: u8 },
    /// Request to block the drawer motion.
    Block,
    /// Request to unblock the drawer motion.
    Unblock,
    /// Request to read the hood open/closed position.
    ReadHoodStatus,

    // --- Device Responses ---
    /// Answer to `Configure`.
    ReportConfigure { status: ReturnCode },
    /// Answer to `Initialize`.
    ReportInitialize { status: ReturnCode },
    /// Answer to `ReadRackRfid`. On failure `uid` and `data` are zeroed.
    ReportReadRackRfid {
        status: ReturnCode,
        channel: u8,
        uid: u32,
        data: u32,
    },
    /// Answer to `Block`.
    ReportBlock { status: ReturnCode },
    /// Answer to `Unblock`.
    ReportUnblock { status: ReturnCode },
    /// Answer to `ReadHoodStatus`.
    ReportHoodStatus { state: HoodState },

    // --- Function-Module Acknowledgments ---
    /// Acknowledges a `set_state` request.
    ReportSetStateAckn {
        instance: InstanceId,
        status: ReturnCode,
    },
    /// Acknowledges an `exec_reference_movement` request with the reached position.
    ReportReferenceMovementAckn {
        instance: InstanceId,
        status: ReturnCode,
        position: i32,
    },
    /// Acknowledges a `set_output_value` request with the actual output value.
    ReportActOutputValue {
        instance: InstanceId,
        status: ReturnCode,
        value: u16,
    },
    /// Acknowledges a `set_login` request.
    ReportLoginAckn {
        instance: InstanceId,
        status: ReturnCode,
    },
    /// Acknowledges a `req_uid` request with the tag uid.
    ReportUid {
        instance: InstanceId,
        status: ReturnCode,
        uid: u32,
    },
    /// Acknowledges a `req_user_data` request with the data word at `address`.
    ReportUserData {
        instance: InstanceId,
        status: ReturnCode,
        address: u8,
        data: u32,
    },
    /// Acknowledges a `req_act_input_value` request with the input value.
    ReportDigInputValue {
        instance: InstanceId,
        status: ReturnCode,
        value: u16,
    },

    // --- Internal Events ---
    /// A hardware step inside `Initializing` failed; the device must fall
    /// back to `Configured` and answer the pending `Initialize` with `code`.
    NeedInitialize { code: ReturnCode },
    /// An LED sequence step failed.
    LedError { code: ReturnCode },
    /// An RFID read step failed.
    RfidError { code: ReturnCode },
    /// Synthesized by the engine when a region's `Final` state is reached.
    /// Matched only by transitions defined on the finished composite itself.
    RegionFinished,
}

/// Fieldless discriminant of [`Event`], used by transitions to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Configure,
    Initialize,
    ReadRackRfid,
    Block,
    Unblock,
    ReadHoodStatus,
    ReportConfigure,
    ReportInitialize,
    ReportReadRackRfid,
    ReportBlock,
    ReportUnblock,
    ReportHoodStatus,
    ReportSetStateAckn,
    ReportReferenceMovementAckn,
    ReportActOutputValue,
    ReportLoginAckn,
    ReportUid,
    ReportUserData,
    ReportDigInputValue,
    NeedInitialize,
    LedError,
    RfidError,
    RegionFinished,
}

impl Event {
    /// Returns the fieldless kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Configure => EventKind::Configure,
            Event::Initialize => EventKind::Initialize,
            Event::ReadRackRfid { .. } => EventKind::ReadRackRfid,
            Event::Block => EventKind::Block,
            Event::Unblock => EventKind::Unblock,
            Event::ReadHoodStatus => EventKind::ReadHoodStatus,
            Event::ReportConfigure { .. } => EventKind::ReportConfigure,
            Event::ReportInitialize { .. } => EventKind::ReportInitialize,
            Event::ReportReadRackRfid { .. } => EventKind::ReportReadRackRfid,
            Event::ReportBlock { .. } => EventKind::ReportBlock,
            Event::ReportUnblock { .. } => EventKind::ReportUnblock,
            Event::ReportHoodStatus { .. } => EventKind::ReportHoodStatus,
            Event::ReportSetStateAckn { .. } => EventKind::ReportSetStateAckn,
            Event::ReportReferenceMovementAckn { .. } => EventKind::ReportReferenceMovementAckn,
            Event::ReportActOutputValue { .. } => EventKind::ReportActOutputValue,
            Event::ReportLoginAckn { .. } => EventKind::ReportLoginAckn,
            Event::ReportUid { .. } => EventKind::ReportUid,
            Event::ReportUserData { .. } => EventKind::ReportUserData,
            Event::ReportDigInputValue { .. } => EventKind::ReportDigInputValue,
            Event::NeedInitialize { .. } => EventKind::NeedInitialize,
            Event::LedError { .. } => EventKind::LedError,
            Event::RfidError { .. } => EventKind::RfidError,
            Event::RegionFinished => EventKind::RegionFinished,
        }
    }

    /// Returns `true` for externally raised request events.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Event::Configure
                | Event::Initialize
                | Event::ReadRackRfid { .. }
                | Event::Block
                | Event::Unblock
                | Event::ReadHoodStatus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = Event::ReportSetStateAckn {
            instance: InstanceId(3),
            status: ReturnCode::Ok,
        };
        assert_eq!(event.kind(), EventKind::ReportSetStateAckn);
        assert_ne!(event.kind(), Event::Initialize.kind());
    }

    #[test]
    fn requests_are_classified() {
        assert!(Event::ReadRackRfid { channel: 1 }.is_request());
        assert!(!Event::RegionFinished.is_request());
        assert!(
            !Event::ReportBlock {
                status: ReturnCode::Ok
            }
            .is_request()
        );
    }
}
