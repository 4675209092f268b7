/// Errors that can occur while decoding a device payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The encoder type byte is not a known [`crate::EncoderType`].
    #[error("unknown encoder type {0}")]
    UnknownEncoderType(u8),

    /// The gain selector byte is not a known [`crate::GainKind`].
    #[error("unknown gain kind {0}")]
    UnknownGainKind(u8),

    /// The message has a fixed size and the frame length differs.
    #[error("expected {expected} payload bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// The frame is too short for the message.
    #[error("truncated payload: {0}")]
    Payload(#[from] gn10can_frame::PayloadError),
}
