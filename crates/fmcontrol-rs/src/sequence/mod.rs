//! Atomic hardware-sequence sub-machines.
//!
//! Each builder grafts a small composite-exclusive state chain into a device
//! tree, modeling exactly one hardware conversation from request through
//! acknowledgment(s) to completion or error. The guards capture shared
//! endpoint handles; between issuing a request and receiving its
//! acknowledgment the chain is parked in the intermediate state and ignores
//! unrelated events for that channel.

pub mod led;
pub mod motion;
pub mod rfid;
pub mod stepper;

pub use led::LedSequence;
pub use motion::MotionBlock;
pub use rfid::RfidRead;
pub use stepper::StepperInit;

use crate::engine::Outbox;
use alloc::boxed::Box;

/// Hand-over action run when a chain completes and the next sub-machine must
/// issue its first request.
pub type ChainAction = Box<dyn FnMut(&mut Outbox)>;
