/// Errors that can occur while decoding an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The device-type field holds a value outside the enumerated set.
    #[error("unknown device type {0} in identifier")]
    UnknownDeviceType(u8),

    /// Bits above the identifier layout are set.
    #[error("identifier {0:#x} has bits set outside the v1 layout")]
    OutOfRange(u32),
}

/// Errors that can occur while packing or unpacking payload values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// `offset + width` exceeds the buffer capacity or the declared length.
    #[error("payload access out of bounds (offset {offset}, width {width}, limit {limit})")]
    OutOfBounds {
        offset: usize,
        width: usize,
        limit: usize,
    },
}

/// Errors that can occur while constructing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The payload is longer than a classic CAN frame can carry.
    #[error("frame data too long ({len} bytes, max {max})")]
    DataTooLong { len: usize, max: usize },

    /// The identifier does not fit the 29-bit extended identifier space.
    #[error("identifier {0:#x} exceeds the 29-bit extended range")]
    InvalidIdentifier(u32),

    /// Identifier decoding failed.
    #[error(transparent)]
    Id(#[from] IdError),

    /// Payload packing failed.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
