//! Scriptable In-Memory Bus
//!
//! A hardware-free [`CanBus`] implementation for tests and bench rigs.
//! It records everything the poller does (initialization arguments,
//! filter changes, transmitted frames) and plays back queued frames on
//! `receive`, honoring the installed acceptance filters the way a real
//! controller would.

use crate::bus::{BusMode, BusStatus, CanBus};
use crate::error::BusInitError;
use crate::frame::CanFrame;
use std::collections::VecDeque;

/// A queued frame plus the number of empty receive polls preceding it
struct Pending {
    frame: CanFrame,
    after_polls: u32,
}

/// In-memory CAN bus double
#[derive(Default)]
pub struct MockBus {
    pending: VecDeque<Pending>,
    /// Every frame transmitted through the bus, in order
    pub sent: Vec<CanFrame>,
    /// Currently installed acceptance filters as `(id, mask)` pairs
    pub filters: Vec<(u16, u16)>,
    /// Arguments of the last successful `begin` call
    pub started: Option<(u32, BusMode)>,
    /// Error state reported to the poller
    pub status: BusStatus,
    /// Force the next `begin` call to fail
    pub fail_begin: bool,
    /// Number of `clear_filters` calls observed
    pub filter_resets: u32,
}

impl MockBus {
    /// Create an idle bus with no queued frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for immediate delivery
    pub fn enqueue(&mut self, frame: CanFrame) {
        self.enqueue_after(frame, 0);
    }

    /// Queue a frame delivered only after `polls` empty receive calls
    pub fn enqueue_after(&mut self, frame: CanFrame, polls: u32) {
        self.pending.push_back(Pending {
            frame,
            after_polls: polls,
        });
    }

    /// Report `status` from subsequent `error_status` calls
    pub fn set_status(&mut self, status: BusStatus) {
        self.status = status;
    }

    fn accepts(&self, id: u16) -> bool {
        self.filters
            .iter()
            .any(|(fid, mask)| id & mask == fid & mask)
    }
}

impl CanBus for MockBus {
    fn begin(&mut self, bit_rate: u32, mode: BusMode) -> Result<(), BusInitError> {
        if self.fail_begin {
            return Err(BusInitError("mock controller configured to fail".into()));
        }
        self.started = Some((bit_rate, mode));
        Ok(())
    }

    fn clear_filters(&mut self) {
        self.filters.clear();
        self.filter_resets += 1;
    }

    fn add_filter(&mut self, id: u16, mask: u16) {
        self.filters.push((id, mask));
    }

    fn transmit(&mut self, frame: &CanFrame) {
        self.sent.push(*frame);
    }

    fn receive(&mut self) -> Option<CanFrame> {
        let front = self.pending.front_mut()?;
        if front.after_polls > 0 {
            front.after_polls -= 1;
            return None;
        }
        let frame = self.pending.pop_front()?.frame;
        // A frame the acceptance filters reject is dropped, not held.
        if self.accepts(frame.id) {
            Some(frame)
        } else {
            None
        }
    }

    fn error_status(&self) -> BusStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::STANDARD_ID_MASK;

    #[test]
    fn test_begin_records_arguments() {
        let mut bus = MockBus::new();
        bus.begin(250_000, BusMode::Loopback).unwrap();
        assert_eq!(bus.started, Some((250_000, BusMode::Loopback)));
    }

    #[test]
    fn test_begin_failure_injection() {
        let mut bus = MockBus::new();
        bus.fail_begin = true;
        assert!(bus.begin(500_000, BusMode::Normal).is_err());
        assert!(bus.started.is_none());
    }

    #[test]
    fn test_filters_gate_delivery() {
        let mut bus = MockBus::new();
        bus.add_filter(0x200, STANDARD_ID_MASK);
        bus.enqueue(CanFrame::empty(0x300));
        bus.enqueue(CanFrame::empty(0x200));

        // The 0x300 frame is dropped by the filter, the 0x200 one passes.
        assert_eq!(bus.receive(), None);
        assert_eq!(bus.receive().map(|f| f.id), Some(0x200));
    }

    #[test]
    fn test_delayed_delivery() {
        let mut bus = MockBus::new();
        bus.add_filter(0x100, STANDARD_ID_MASK);
        bus.enqueue_after(CanFrame::empty(0x100), 2);

        assert_eq!(bus.receive(), None);
        assert_eq!(bus.receive(), None);
        assert_eq!(bus.receive().map(|f| f.id), Some(0x100));
    }
}
