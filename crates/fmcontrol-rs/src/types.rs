use core::fmt;

/// Identifies one function-module endpoint instance, wrapping a `u8` to ensure
/// type safety.
///
/// Every acknowledgment raised by a function module carries the instance id of
/// the endpoint that produced it, so a device assembly with several endpoints
/// of the same capability (e.g. two digital outputs) can tell them apart.
/// This newtype pattern prevents accidental use of arbitrary `u8` values where
/// an `InstanceId` is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u8);

impl From<InstanceId> for u8 {
    /// Converts an `InstanceId` back into its underlying `u8` representation.
    fn from(instance: InstanceId) -> Self {
        instance.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FM{}", self.0)
    }
}

/// Closed status enumeration shared by every request/acknowledgment exchange.
///
/// `Ok` is the single success value. All other values are failures; at this
/// layer the specific failure reason is only forwarded upward as data and is
/// never branched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReturnCode {
    /// The operation was dispatched/completed successfully.
    #[default]
    Ok = 0,
    /// Generic hardware or endpoint failure.
    Failed = 1,
    /// The request arrived while the machine was not in a state that accepts it.
    InvalidState = 2,
    /// A request parameter was out of range for the endpoint.
    InvalidParameter = 3,
    /// The endpoint reported a timeout on the wire.
    Timeout = 4,
    /// The transport below the endpoint failed.
    CommunicationError = 5,
}

impl ReturnCode {
    /// Returns `true` for the single success value.
    pub fn is_ok(self) -> bool {
        self == ReturnCode::Ok
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "Ok"),
            Self::Failed => write!(f, "Failed"),
            Self::InvalidState => write!(f, "InvalidState"),
            Self::InvalidParameter => write!(f, "InvalidParameter"),
            Self::Timeout => write!(f, "Timeout"),
            Self::CommunicationError => write!(f, "CommunicationError"),
        }
    }
}

/// Position of the hood as reported by its digital input endpoint.
///
/// `Unknown` is reported when the status read was rejected or failed, so a
/// `ReadHoodStatus` request is always answered even on the negative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoodState {
    /// The hood switch reads "open".
    Open,
    /// The hood switch reads "closed".
    Closed,
    /// The hood position could not be determined.
    #[default]
    Unknown,
}

// --- Protocol Constants ---

/// Default login password presented to an RFID endpoint before reading.
pub const C_RFID_DEFAULT_PASSWORD: u32 = 0x0000_0000;

/// Default user-data address read from an RFID tag.
pub const C_RFID_DEFAULT_ADDRESS: u8 = 0;

/// Output value driving an LED channel on.
pub const C_LED_OUTPUT_ON: u16 = 1;

/// Output value driving an LED channel off.
pub const C_LED_OUTPUT_OFF: u16 = 0;
