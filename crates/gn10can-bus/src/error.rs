use gn10can_frame::RouteKey;

/// Errors that can occur in bus operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// A live handler is already registered under this key.
    #[error("a device is already registered at {key}")]
    DuplicateRegistration { key: RouteKey },

    /// Driver-level error.
    #[error("transport error: {0}")]
    Transport(#[from] gn10can_transport::TransportError),

    /// Frame construction error.
    #[error("frame error: {0}")]
    Frame(#[from] gn10can_frame::FrameError),

    /// The driver is already in use further up the call stack.
    ///
    /// Raised when a driver calls back into the bus that owns it from
    /// inside `send` or `receive`.
    #[error("driver is busy")]
    DriverBusy,
}

pub type Result<T> = std::result::Result<T, BusError>;
