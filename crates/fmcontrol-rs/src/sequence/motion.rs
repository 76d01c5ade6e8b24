use super::LedSequence;
use crate::device::Device;
use crate::engine::{StateId, StateKind};
use crate::event::{Event, EventKind};
use crate::types::ReturnCode;
use alloc::boxed::Box;

/// Motion block/unblock sub-machine.
///
/// `Closed --Block--> Blocking --done--> Blocked --Unblock--> Unblocking
/// --done--> Closed`. Both directions delegate their signaling to a nested
/// [`LedSequence`]; its completion maps to success and its `LedError` maps to
/// a failure response. The two directions intentionally have different
/// failure landing states: an error while blocking returns to `Closed`, an
/// error while unblocking returns to `Blocked`, resolving "we don't know if
/// the physical motion happened" toward the safer assumed position.
pub struct MotionBlock {
    block_seq: LedSequence,
    unblock_seq: LedSequence,
}

impl MotionBlock {
    pub fn new(block_seq: LedSequence, unblock_seq: LedSequence) -> Self {
        Self {
            block_seq,
            unblock_seq,
        }
    }

    /// Grafts the sub-machine into `region` (an `Exclusive` composite inside
    /// the owning device's `Working` state) and installs the region's own
    /// default-rejection transitions for `Block`/`Unblock`.
    pub fn install(&self, device: &mut Device, region: StateId) {
        let machine = &mut device.machine;
        let closed = machine.add_state("MotionClosed", StateKind::Simple, Some(region));
        let blocking = machine.add_state("MotionBlocking", StateKind::Exclusive, Some(region));
        let blocked = machine.add_state("MotionBlocked", StateKind::Simple, Some(region));
        let unblocking = machine.add_state("MotionUnblocking", StateKind::Exclusive, Some(region));
        machine.set_initial(region, closed);

        let blocking_done = machine.add_state("BlockingDone", StateKind::Final, Some(blocking));
        let entry = self
            .block_seq
            .install(machine, blocking, blocking_done, "Blocking", None);
        machine.set_initial(blocking, entry);

        let unblocking_done =
            machine.add_state("UnblockingDone", StateKind::Final, Some(unblocking));
        let entry = self
            .unblock_seq
            .install(machine, unblocking, unblocking_done, "Unblocking", None);
        machine.set_initial(unblocking, entry);

        let seq = self.block_seq.clone();
        machine.add_transition(
            closed,
            EventKind::Block,
            Some(blocking),
            Some(Box::new(move |outbox, _| {
                seq.kick(outbox);
                true
            })),
        );
        machine.add_transition(
            blocking,
            EventKind::RegionFinished,
            Some(blocked),
            Some(Box::new(|outbox, _| {
                outbox.emit(Event::ReportBlock {
                    status: ReturnCode::Ok,
                });
                true
            })),
        );
        machine.add_transition(
            blocking,
            EventKind::LedError,
            Some(closed),
            Some(Box::new(|outbox, event| {
                let Event::LedError { code } = event else {
                    return false;
                };
                outbox.emit(Event::ReportBlock { status: *code });
                true
            })),
        );

        let seq = self.unblock_seq.clone();
        machine.add_transition(
            blocked,
            EventKind::Unblock,
            Some(unblocking),
            Some(Box::new(move |outbox, _| {
                seq.kick(outbox);
                true
            })),
        );
        machine.add_transition(
            unblocking,
            EventKind::RegionFinished,
            Some(closed),
            Some(Box::new(|outbox, _| {
                outbox.emit(Event::ReportUnblock {
                    status: ReturnCode::Ok,
                });
                true
            })),
        );
        machine.add_transition(
            unblocking,
            EventKind::LedError,
            Some(blocked),
            Some(Box::new(|outbox, event| {
                let Event::LedError { code } = event else {
                    return false;
                };
                outbox.emit(Event::ReportUnblock { status: *code });
                true
            })),
        );

        // Block in Blocking/Blocked/Unblocking and Unblock anywhere but
        // Blocked are answered negatively at the region level.
        device.install_nack(region, EventKind::Block, |_| Event::ReportBlock {
            status: ReturnCode::InvalidState,
        });
        device.install_nack(region, EventKind::Unblock, |_| Event::ReportUnblock {
            status: ReturnCode::InvalidState,
        });
    }
}
