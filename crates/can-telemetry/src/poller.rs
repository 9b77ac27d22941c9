//! Telemetry Poller
//!
//! Drives one request/response cycle per call: arm the receive filter,
//! transmit the query (unless listening passively), busy-wait for the
//! first accepted frame or the timeout, decode the payload. The bus's
//! acceptance filter always returns to the node's own identifier before
//! `poll` returns, on every exit path.

use crate::bus::{BusMode, CanBus};
use crate::error::TelemetryError;
use crate::frame::{CanFrame, MAX_PAYLOAD, STANDARD_ID_MASK};
use crate::request::{PollMode, PollRequest, PollerConfig};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// All-ones value the firmware API returns for every failure
pub const NO_RESPONSE: u64 = u64::MAX;

/// Synchronous request/response poller for a single telemetry node
///
/// Owns the bus handle exclusively; the borrow checker enforces the
/// one-poller-one-bus assumption. `poll` blocks the calling thread for
/// up to the configured timeout.
pub struct TelemetryPoller<B: CanBus> {
    bus: B,
    node_id: u16,
    timeout: Duration,
}

impl<B: CanBus> TelemetryPoller<B> {
    /// Bring up the bus and install the node's default receive filter
    ///
    /// The bus is started in loopback mode when `config.debug` is set.
    /// An initialization failure is propagated as a hard error; no
    /// poller exists to return a sentinel from.
    pub fn new(mut bus: B, config: PollerConfig) -> Result<Self, TelemetryError> {
        let mode = if config.debug {
            BusMode::Loopback
        } else {
            BusMode::Normal
        };
        bus.begin(config.bit_rate, mode)?;
        info!(
            "CAN telemetry poller up: node {:03X} at {} bit/s ({:?})",
            config.node_id, config.bit_rate, mode
        );

        let mut poller = Self {
            bus,
            node_id: config.node_id,
            timeout: Duration::from_millis(config.timeout_ms),
        };
        poller.restore_filter();
        Ok(poller)
    }

    /// Poll the bus once and decode the response payload
    ///
    /// In `QueryResponse` mode the request frame is transmitted first;
    /// in `PassiveListen` mode the call is a bounded listen for any
    /// frame matching the filter. The first accepted frame wins.
    pub fn poll(&mut self, req: &PollRequest) -> Result<u64, TelemetryError> {
        // Fast-fail guard: an oversize payload never touches the bus.
        if req.payload.len() > MAX_PAYLOAD {
            return Err(TelemetryError::PayloadTooLong(req.payload.len()));
        }

        self.set_filter(req.filter_id());
        let outcome = self.exchange(req);
        // Invariant: the default filter is back in place on every exit
        // path from here on.
        self.restore_filter();
        outcome
    }

    /// Compatibility form collapsing every failure onto [`NO_RESPONSE`]
    ///
    /// Ported callers that keyed on the all-ones sentinel can keep
    /// doing so; new code should match on [`poll`](Self::poll) errors
    /// instead, since an all-ones payload is a legitimate decoding.
    pub fn poll_raw(&mut self, req: &PollRequest) -> u64 {
        self.poll(req).unwrap_or(NO_RESPONSE)
    }

    /// Replace the response timeout for all subsequent polls
    pub fn change_timeout(&mut self, timeout_ms: u64) {
        debug!("Response timeout set to {}ms", timeout_ms);
        self.timeout = Duration::from_millis(timeout_ms);
    }

    /// The active response timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// This node's 11-bit identifier
    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Direct access to the underlying bus driver
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable access to the underlying bus driver
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the poller and hand the bus handle back
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Transmit the query (if any) and wait out the response window
    ///
    /// Runs with the request filter armed; `poll` restores the default
    /// afterwards.
    fn exchange(&mut self, req: &PollRequest) -> Result<u64, TelemetryError> {
        if req.mode == PollMode::QueryResponse {
            debug!(
                "Query {:03X}: {} byte {:?} frame, listening on {:03X}",
                req.header,
                req.payload.len(),
                req.kind,
                req.filter_id()
            );
            self.bus.transmit(&req.to_frame());
        }

        let status = self.bus.error_status();
        if status.is_error() {
            warn!("CAN bus reports {:?} before wait, probing the bus", status);
            // Fire-and-forget probe addressed to ourselves; any reply is
            // not waited for.
            self.bus.transmit(&CanFrame::empty(self.node_id));
            return Err(TelemetryError::BusError(status));
        }

        let started = Instant::now();
        loop {
            if let Some(frame) = self.bus.receive() {
                debug!("Matched frame {:03X}, dlc {}", frame.id, frame.dlc);
                return Ok(decode(frame.payload()));
            }
            if started.elapsed() >= self.timeout {
                let ms = self.timeout.as_millis() as u64;
                warn!("No response on {:03X} after {}ms", req.filter_id(), ms);
                return Err(TelemetryError::TimedOut(ms));
            }
        }
    }

    /// Arm a single exact-match acceptance filter
    ///
    /// Always a full clear-then-reinstall, so stale entries cannot
    /// accumulate across calls.
    fn set_filter(&mut self, id: u16) {
        self.bus.clear_filters();
        self.bus.add_filter(id, STANDARD_ID_MASK);
    }

    /// Re-arm the node's default filter
    fn restore_filter(&mut self) {
        self.set_filter(self.node_id);
    }
}

/// Pack up to 8 payload bytes into a `u64`, least significant byte first
///
/// Unused high-order bytes are zero filled, so an empty payload decodes
/// to 0 and an `n`-byte payload always decodes below `2^(8n)`. Callers
/// hand in at most 8 bytes, the payload of one CAN frame.
pub fn decode(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; MAX_PAYLOAD];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
