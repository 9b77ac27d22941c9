//! Telemetry Error Types

use crate::bus::BusStatus;
use thiserror::Error;

/// Failure raised by a driver that could not bring the controller up
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BusInitError(pub String);

/// Errors that can occur while polling the bus
#[derive(Debug, Clone, Error)]
pub enum TelemetryError {
    /// Bus controller failed to initialize
    #[error("Bus initialization failed: {0}")]
    InitFailed(#[from] BusInitError),

    /// Query payload exceeds the CAN frame limit
    #[error("Payload of {0} bytes exceeds the 8 byte CAN frame limit")]
    PayloadTooLong(usize),

    /// Timeout waiting for a matching frame
    #[error("Timeout waiting for telemetry response after {0}ms")]
    TimedOut(u64),

    /// Bus reported an error condition before the wait began
    #[error("CAN bus error: controller reports {0:?}")]
    BusError(BusStatus),
}
