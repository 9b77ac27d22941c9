//! Poll Requests and Poller Configuration

use crate::frame::{CanFrame, MAX_PAYLOAD};
use serde::{Deserialize, Serialize};

/// Default response timeout
const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Default bit rate (500 kbit/s, the common high-speed CAN rate)
const DEFAULT_BIT_RATE: u32 = 500_000;

/// How a single poll interacts with the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollMode {
    /// Transmit a query frame, then wait for the response
    QueryResponse,
    /// Transmit nothing; bounded listen for any frame matching the filter
    PassiveListen,
}

/// Wire format of the outgoing query frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    /// Ordinary data frame
    Data,
    /// Remote transmission request
    Remote,
}

/// Description of a single bus poll
///
/// Built fresh per call; nothing in it persists across polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRequest {
    /// Identifier the query frame is sent under
    pub header: u16,
    /// Response identifier to accept; `None` listens on `header`
    pub filter: Option<u16>,
    /// Query-then-wait or listen-only
    pub mode: PollMode,
    /// Data or remote query frame
    pub kind: FrameKind,
    /// Query payload; its length is authoritative (at most 8 bytes)
    pub payload: Vec<u8>,
}

impl PollRequest {
    /// Query request expecting the response on `header`
    pub fn query(header: u16) -> Self {
        Self {
            header,
            filter: None,
            mode: PollMode::QueryResponse,
            kind: FrameKind::Data,
            payload: Vec::new(),
        }
    }

    /// Bounded listen for frames matching `filter`, with no transmission
    pub fn passive(filter: u16) -> Self {
        Self {
            header: filter,
            filter: Some(filter),
            mode: PollMode::PassiveListen,
            kind: FrameKind::Data,
            payload: Vec::new(),
        }
    }

    /// Accept responses on `filter` instead of the header identifier
    pub fn with_filter(mut self, filter: u16) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attach a query payload
    pub fn with_payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    /// Send the query as a remote frame
    pub fn as_remote(mut self) -> Self {
        self.kind = FrameKind::Remote;
        self
    }

    /// Identifier the receive filter is armed with
    pub(crate) fn filter_id(&self) -> u16 {
        self.filter.unwrap_or(self.header)
    }

    /// Build the outgoing query frame
    ///
    /// The payload length has already been validated by the poller.
    pub(crate) fn to_frame(&self) -> CanFrame {
        let mut data = [0u8; MAX_PAYLOAD];
        if matches!(self.kind, FrameKind::Data) {
            data[..self.payload.len()].copy_from_slice(&self.payload);
        }
        CanFrame {
            id: self.header,
            dlc: self.payload.len() as u8,
            remote: matches!(self.kind, FrameKind::Remote),
            data,
        }
    }
}

/// Poller configuration applied at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// CAN bit rate in bits per second
    pub bit_rate: u32,
    /// 11-bit identifier of this node, also the default receive filter
    pub node_id: u16,
    /// Response timeout in milliseconds
    pub timeout_ms: u64,
    /// Run the bus in loopback test mode
    pub debug: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            bit_rate: DEFAULT_BIT_RATE,
            node_id: 0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let req = PollRequest::query(0x200);
        assert_eq!(req.header, 0x200);
        assert_eq!(req.filter, None);
        assert_eq!(req.filter_id(), 0x200);
        assert_eq!(req.mode, PollMode::QueryResponse);
        assert_eq!(req.kind, FrameKind::Data);
        assert!(req.payload.is_empty());
    }

    #[test]
    fn test_explicit_filter_overrides_header() {
        let req = PollRequest::query(0x200).with_filter(0x300);
        assert_eq!(req.filter_id(), 0x300);
    }

    #[test]
    fn test_passive_listens_on_filter() {
        let req = PollRequest::passive(0x150);
        assert_eq!(req.mode, PollMode::PassiveListen);
        assert_eq!(req.filter_id(), 0x150);
    }

    #[test]
    fn test_query_frame_layout() {
        let frame = PollRequest::query(0x200)
            .with_payload(&[0x01, 0x02])
            .to_frame();
        assert_eq!(frame.id, 0x200);
        assert_eq!(frame.dlc, 2);
        assert!(!frame.remote);
        assert_eq!(frame.payload(), &[0x01, 0x02]);
    }

    #[test]
    fn test_remote_frame_zeroes_data() {
        let frame = PollRequest::query(0x200)
            .with_payload(&[0xFF, 0xFF, 0xFF])
            .as_remote()
            .to_frame();
        assert!(frame.remote);
        assert_eq!(frame.dlc, 3);
        assert_eq!(frame.data, [0u8; MAX_PAYLOAD]);
    }
}
