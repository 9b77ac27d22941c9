//! CAN Frame Representation

use serde::{Deserialize, Serialize};

/// Comparison mask selecting all 11 bits of a standard CAN identifier
pub const STANDARD_ID_MASK: u16 = 0x7FF;

/// Maximum payload length of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

/// A classic CAN 2.0A frame with an 11-bit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    /// 11-bit identifier (0..=0x7FF)
    pub id: u16,
    /// Data length code (0-8)
    pub dlc: u8,
    /// Remote transmission request flag
    pub remote: bool,
    /// Payload bytes; only the first `dlc` are meaningful
    pub data: [u8; MAX_PAYLOAD],
}

impl CanFrame {
    /// Create a data frame carrying `payload`
    ///
    /// Returns `None` when the payload exceeds the 8 byte CAN limit.
    pub fn new(id: u16, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_PAYLOAD {
            return None;
        }
        let mut data = [0u8; MAX_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id,
            dlc: payload.len() as u8,
            remote: false,
            data,
        })
    }

    /// Create a remote frame requesting `dlc` bytes
    ///
    /// Returns `None` when `dlc` exceeds 8.
    pub fn remote(id: u16, dlc: u8) -> Option<Self> {
        if dlc as usize > MAX_PAYLOAD {
            return None;
        }
        Some(Self {
            id,
            dlc,
            remote: true,
            data: [0u8; MAX_PAYLOAD],
        })
    }

    /// Zero-length data frame, used as a bus probe
    pub fn empty(id: u16) -> Self {
        Self {
            id,
            dlc: 0,
            remote: false,
            data: [0u8; MAX_PAYLOAD],
        }
    }

    /// The `dlc`-long prefix of the payload
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.dlc as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_frame_construction() {
        let frame = CanFrame::new(0x123, &[0xAA, 0xBB]).unwrap();
        assert_eq!(frame.id, 0x123);
        assert_eq!(frame.dlc, 2);
        assert!(!frame.remote);
        assert_eq!(frame.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_oversize_payload_rejected() {
        assert!(CanFrame::new(0x123, &[0u8; 9]).is_none());
        assert!(CanFrame::remote(0x123, 9).is_none());
    }

    #[test]
    fn test_remote_frame_carries_no_data() {
        let frame = CanFrame::remote(0x456, 4).unwrap();
        assert!(frame.remote);
        assert_eq!(frame.dlc, 4);
        assert_eq!(frame.data, [0u8; MAX_PAYLOAD]);
    }

    #[test]
    fn test_empty_frame() {
        let frame = CanFrame::empty(0x100);
        assert_eq!(frame.dlc, 0);
        assert!(frame.payload().is_empty());
    }
}
