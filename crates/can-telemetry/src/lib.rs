//! CAN Telemetry Polling
//!
//! Synchronous request/response polling for a single telemetry node on
//! a classic CAN bus. Each poll optionally transmits a query frame,
//! arms an exact-match receive filter, busy-waits for the first
//! accepted frame or a wall-clock timeout, and decodes the payload
//! bytes into a `u64` by little-endian zero extension.
//!
//! The poller is generic over the [`CanBus`] driver trait, so the same
//! logic runs against real transceiver drivers and the in-memory
//! [`MockBus`].

mod bus;
mod error;
mod frame;
mod mock;
mod poller;
mod request;

pub use bus::{BusMode, BusStatus, CanBus};
pub use error::{BusInitError, TelemetryError};
pub use frame::{CanFrame, MAX_PAYLOAD, STANDARD_ID_MASK};
pub use mock::MockBus;
pub use poller::{decode, TelemetryPoller, NO_RESPONSE};
pub use request::{FrameKind, PollMode, PollRequest, PollerConfig};
