use gn10can_frame::Frame;

use crate::error::Result;

/// Send and poll capability of a CAN controller.
///
/// Both calls are non-blocking. `receive` returns `Ok(None)` when no frame
/// is pending. Frames received in interrupt context must be queued by the
/// implementation so that `receive` can drain them from the polling thread.
pub trait CanDriver {
    /// Queue a frame for transmission.
    fn send(&mut self, frame: &Frame) -> Result<()>;

    /// Take the next received frame, if any.
    fn receive(&mut self) -> Result<Option<Frame>>;
}

impl<D: CanDriver + ?Sized> CanDriver for &mut D {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        (**self).receive()
    }
}

impl<D: CanDriver + ?Sized> CanDriver for Box<D> {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        (**self).receive()
    }
}
