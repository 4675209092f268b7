/// Errors reported by a CAN driver.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The controller rejected the frame (bus-off, mailbox error, ...).
    #[error("driver rejected frame: {0}")]
    Rejected(String),

    /// No transmit or receive slot is free.
    #[error("queue full ({capacity} frames)")]
    QueueFull { capacity: usize },

    /// A raw controller frame could not be converted.
    ///
    /// For controller drivers outside this workspace; [`crate::MemoryDriver`]
    /// only carries already-built frames.
    #[error("malformed frame: {0}")]
    Frame(#[from] gn10can_frame::FrameError),

    /// An I/O error occurred on the underlying device.
    ///
    /// For OS-backed drivers (SocketCAN, serial adapters) outside this workspace.
    #[error("driver I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The driver has been shut down.
    #[error("driver closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use std::io;

    use gn10can_frame::Frame;

    use super::*;

    fn read_controller(raw_id: u32) -> Result<Frame> {
        if raw_id == 0 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no ack").into());
        }
        Ok(Frame::new(raw_id, &[])?)
    }

    #[test]
    fn driver_errors_convert_with_question_mark() {
        assert!(matches!(read_controller(0), Err(TransportError::Io(_))));
        assert!(matches!(
            read_controller(0x2000_0000),
            Err(TransportError::Frame(_))
        ));
        assert!(read_controller(0x123).is_ok());
    }
}
