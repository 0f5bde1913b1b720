//! Error types for the USB transport

use thiserror::Error;

/// Result type for adapter open/enumeration operations
pub type Result<T> = std::result::Result<T, NdsUsbError>;

/// Errors raised while bringing the adapter up. Transfer failures after
/// open are reported through `ndsplus_core::transport::TransportFault`.
#[derive(Debug, Error)]
pub enum NdsUsbError {
    #[error("NDS Adapter+ not found (VID:4670 PID:9394) - is it plugged in?")]
    DeviceNotFound,

    #[error("failed to open NDS Adapter+: {0}")]
    OpenFailed(String),

    #[error("failed to claim interface - do you have access to the device? ({0})")]
    ClaimFailed(String),
}
