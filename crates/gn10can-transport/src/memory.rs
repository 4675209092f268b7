use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gn10can_frame::Frame;
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::CanDriver;

#[derive(Debug, Default)]
struct Queues {
    rx: VecDeque<Frame>,
    rx_capacity: Option<usize>,
    sent: Vec<Frame>,
    refuse_sends: bool,
    closed: bool,
}

/// In-memory CAN driver.
///
/// Clones share the same queues, so a test can keep one clone to inject
/// received frames and inspect sent ones while the bus owns another.
/// [`MemoryDriver::pair`] links two endpoints: whatever one sends, the
/// other receives.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    local: Arc<Mutex<Queues>>,
    peer: Option<Arc<Mutex<Queues>>>,
}

impl MemoryDriver {
    /// Create a standalone driver. Sent frames are only recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create two linked endpoints.
    pub fn pair() -> (Self, Self) {
        let left = Arc::new(Mutex::new(Queues::default()));
        let right = Arc::new(Mutex::new(Queues::default()));
        (
            Self {
                local: Arc::clone(&left),
                peer: Some(Arc::clone(&right)),
            },
            Self {
                local: right,
                peer: Some(left),
            },
        )
    }

    /// Bound the receive queue. Frames arriving at a full queue are refused.
    pub fn with_rx_capacity(self, capacity: usize) -> Self {
        lock(&self.local).rx_capacity = Some(capacity);
        self
    }

    /// Queue a frame as if it had arrived from the bus.
    pub fn push_receive_frame(&self, frame: Frame) -> Result<()> {
        enqueue(&self.local, frame)
    }

    /// Frames sent through this endpoint, oldest first.
    pub fn sent_frames(&self) -> Vec<Frame> {
        lock(&self.local).sent.clone()
    }

    /// Drain the record of sent frames.
    pub fn take_sent(&self) -> Vec<Frame> {
        std::mem::take(&mut lock(&self.local).sent)
    }

    /// Number of received frames not yet polled.
    pub fn pending(&self) -> usize {
        lock(&self.local).rx.len()
    }

    /// Make subsequent sends fail with [`TransportError::Rejected`].
    pub fn set_refuse_sends(&self, refuse: bool) {
        lock(&self.local).refuse_sends = refuse;
    }

    /// Shut the endpoint down. Later sends and receives fail with [`TransportError::Closed`].
    pub fn close(&self) {
        debug!("closing memory driver");
        lock(&self.local).closed = true;
    }
}

impl CanDriver for MemoryDriver {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        {
            let local = lock(&self.local);
            if local.closed {
                return Err(TransportError::Closed);
            }
            if local.refuse_sends {
                return Err(TransportError::Rejected("sends disabled".to_string()));
            }
        }

        if let Some(peer) = &self.peer {
            enqueue(peer, *frame)?;
        }

        trace!(%frame, "memory driver sent frame");
        lock(&self.local).sent.push(*frame);
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        let mut local = lock(&self.local);
        if local.closed {
            return Err(TransportError::Closed);
        }
        Ok(local.rx.pop_front())
    }
}

fn enqueue(queues: &Mutex<Queues>, frame: Frame) -> Result<()> {
    let mut queues = lock(queues);
    if queues.closed {
        return Err(TransportError::Closed);
    }
    if let Some(capacity) = queues.rx_capacity {
        if queues.rx.len() >= capacity {
            return Err(TransportError::QueueFull { capacity });
        }
    }
    queues.rx.push_back(frame);
    Ok(())
}

fn lock(queues: &Mutex<Queues>) -> MutexGuard<'_, Queues> {
    queues.lock().unwrap_or_else(PoisonError::into_inner)
}
