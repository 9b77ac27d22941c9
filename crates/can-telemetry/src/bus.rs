//! CAN Bus Abstraction
//!
//! Contract required of the transceiver driver. The poller is generic
//! over this trait, so the same polling logic runs against SocketCAN
//! wrappers, MCU register drivers, or the in-memory [`MockBus`].
//!
//! [`MockBus`]: crate::MockBus

use crate::error::BusInitError;
use crate::frame::CanFrame;
use serde::{Deserialize, Serialize};

/// Bus operating mode selected at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusMode {
    /// Normal transmit/receive operation
    Normal,
    /// Loopback test mode; frames are echoed back instead of driven
    /// onto the wire
    Loopback,
}

/// Controller error state reported by the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusStatus {
    /// No error condition present
    NoError,
    /// Error counters above the warning limit
    ErrorWarning,
    /// Controller in error-passive state
    ErrorPassive,
    /// Controller has disconnected from the bus
    BusOff,
}

impl BusStatus {
    /// Whether the controller reports any error condition
    pub fn is_error(&self) -> bool {
        !matches!(self, BusStatus::NoError)
    }
}

impl Default for BusStatus {
    fn default() -> Self {
        BusStatus::NoError
    }
}

/// Low-level CAN transceiver driver
pub trait CanBus {
    /// Initialize the controller at the given bit rate
    fn begin(&mut self, bit_rate: u32, mode: BusMode) -> Result<(), BusInitError>;

    /// Remove all active acceptance filters
    fn clear_filters(&mut self);

    /// Install an acceptance filter
    ///
    /// `mask` selects which identifier bits must match `id` for a frame
    /// to be accepted.
    fn add_filter(&mut self, id: u16, mask: u16);

    /// Queue a frame for transmission
    fn transmit(&mut self, frame: &CanFrame);

    /// Non-blocking receive; `None` when no accepted frame is pending
    fn receive(&mut self) -> Option<CanFrame>;

    /// Current controller error state
    fn error_status(&self) -> BusStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_classification() {
        assert!(!BusStatus::NoError.is_error());
        assert!(BusStatus::ErrorWarning.is_error());
        assert!(BusStatus::ErrorPassive.is_error());
        assert!(BusStatus::BusOff.is_error());
    }
}
