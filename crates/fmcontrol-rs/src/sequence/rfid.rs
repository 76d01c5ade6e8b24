use crate::device::Device;
use crate::engine::{StateId, StateKind};
use crate::event::{Event, EventKind};
use crate::fm::SharedFm;
use crate::types::ReturnCode;
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

/// Accumulator for one in-flight tag read.
#[derive(Debug, Default, Clone, Copy)]
struct TagRead {
    channel: u8,
    uid: u32,
    data: u32,
}

/// RFID tag-read sub-machine.
///
/// `Idle --ReadRackRfid--> Active{SetState -> SendLogin -> ReadUid ->
/// ReadData} --> Idle`. The accumulated uid/data pair is reported on
/// success; every step failure raises `RfidError(code)`, and the
/// `Active`-level error transition converges all of them onto one cleanup
/// path that answers with a zeroed pair and the failing status.
#[derive(Clone)]
pub struct RfidRead {
    rfid: SharedFm,
    password: u32,
    address: u8,
    read: Rc<RefCell<TagRead>>,
}

impl RfidRead {
    pub fn new(rfid: SharedFm, password: u32, address: u8) -> Self {
        Self {
            rfid,
            password,
            address,
            read: Rc::new(RefCell::new(TagRead::default())),
        }
    }

    /// Grafts the read sub-machine into `region` (an `Exclusive` composite
    /// inside the owning device's `Working` state) and installs the region's
    /// own default-rejection transition for overlapping read requests.
    pub fn install(&self, device: &mut Device, region: StateId) {
        let machine = &mut device.machine;
        let idle = machine.add_state("RfidIdle", StateKind::Simple, Some(region));
        let active = machine.add_state("RfidActive", StateKind::Exclusive, Some(region));
        let set_state_wait = machine.add_state("RfidSetState", StateKind::Simple, Some(active));
        let login_wait = machine.add_state("RfidSendLogin", StateKind::Simple, Some(active));
        let uid_wait = machine.add_state("RfidReadUid", StateKind::Simple, Some(active));
        let data_wait = machine.add_state("RfidReadData", StateKind::Simple, Some(active));
        machine.set_initial(region, idle);
        machine.set_initial(active, set_state_wait);

        // Request accepted only from Idle. The conversation is entered even
        // when the first request is rejected synchronously; the raised
        // RfidError then converges on the Active-level cleanup path, so the
        // caller gets exactly one answer either way.
        let seq = self.clone();
        machine.add_transition(
            idle,
            EventKind::ReadRackRfid,
            Some(active),
            Some(Box::new(move |outbox, event| {
                let Event::ReadRackRfid { channel } = event else {
                    return false;
                };
                *seq.read.borrow_mut() = TagRead {
                    channel: *channel,
                    uid: 0,
                    data: 0,
                };
                let code = seq.rfid.borrow_mut().set_state(true, *channel);
                if !code.is_ok() {
                    outbox.raise(Event::RfidError { code });
                }
                true
            })),
        );

        let seq = self.clone();
        machine.add_transition(
            set_state_wait,
            EventKind::ReportSetStateAckn,
            Some(login_wait),
            Some(Box::new(move |outbox, event| {
                let Event::ReportSetStateAckn { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::RfidError { code: *status });
                    return false;
                }
                let code = seq.rfid.borrow_mut().set_login(seq.password);
                if !code.is_ok() {
                    outbox.raise(Event::RfidError { code });
                    return false;
                }
                true
            })),
        );

        let seq = self.clone();
        machine.add_transition(
            login_wait,
            EventKind::ReportLoginAckn,
            Some(uid_wait),
            Some(Box::new(move |outbox, event| {
                let Event::ReportLoginAckn { status, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::RfidError { code: *status });
                    return false;
                }
                let code = seq.rfid.borrow_mut().req_uid();
                if !code.is_ok() {
                    outbox.raise(Event::RfidError { code });
                    return false;
                }
                true
            })),
        );

        let seq = self.clone();
        machine.add_transition(
            uid_wait,
            EventKind::ReportUid,
            Some(data_wait),
            Some(Box::new(move |outbox, event| {
                let Event::ReportUid { status, uid, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::RfidError { code: *status });
                    return false;
                }
                seq.read.borrow_mut().uid = *uid;
                let code = seq.rfid.borrow_mut().req_user_data(seq.address);
                if !code.is_ok() {
                    outbox.raise(Event::RfidError { code });
                    return false;
                }
                true
            })),
        );

        let seq = self.clone();
        machine.add_transition(
            data_wait,
            EventKind::ReportUserData,
            Some(idle),
            Some(Box::new(move |outbox, event| {
                let Event::ReportUserData { status, data, .. } = event else {
                    return false;
                };
                if !status.is_ok() {
                    outbox.raise(Event::RfidError { code: *status });
                    return false;
                }
                let read = {
                    let mut read = seq.read.borrow_mut();
                    read.data = *data;
                    *read
                };
                outbox.emit(Event::ReportReadRackRfid {
                    status: ReturnCode::Ok,
                    channel: read.channel,
                    uid: read.uid,
                    data: read.data,
                });
                true
            })),
        );

        // One cleanup path for every step failure.
        let seq = self.clone();
        machine.add_transition(
            active,
            EventKind::RfidError,
            Some(idle),
            Some(Box::new(move |outbox, event| {
                let Event::RfidError { code } = event else {
                    return false;
                };
                let channel = seq.read.borrow().channel;
                outbox.emit(Event::ReportReadRackRfid {
                    status: *code,
                    channel,
                    uid: 0,
                    data: 0,
                });
                true
            })),
        );

        // A second read while one is in flight is answered, not queued.
        device.install_nack(active, EventKind::ReadRackRfid, |event| {
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
    }
}
