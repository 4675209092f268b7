use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use gn10can_frame::{Frame, RouteKey};
use gn10can_transport::CanDriver;
use tracing::{debug, trace, warn};

use crate::config::BusConfig;
use crate::device::{Device, DeviceHandle};
use crate::error::{BusError, Result};
use crate::registry::{Registration, Registry};

/// Outcome of routing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The registered handler received the frame.
    Delivered,
    /// No live handler is registered for the frame's key.
    Unmatched,
    /// Error frames are not routed.
    ErrorFrame,
    /// The handler was already executing further up the stack.
    Busy,
}

/// Counters for one [`CanBus::update`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Frames taken from the driver.
    pub received: usize,
    /// Frames handed to a handler.
    pub delivered: usize,
    /// Frames nobody handled.
    pub dropped: usize,
}

struct Inner<D> {
    driver: RefCell<D>,
    registry: Rc<RefCell<Registry>>,
    config: BusConfig,
}

/// Frame router over one CAN driver.
///
/// `CanBus` is a cheap shared handle: clones refer to the same driver and
/// registry, so devices keep a clone to send frames. It is single-threaded;
/// `update`, `attach` and handle drops all happen on the polling thread.
pub struct CanBus<D> {
    inner: Rc<Inner<D>>,
}

impl<D> Clone for CanBus<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: CanDriver> CanBus<D> {
    /// Create a bus with default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, BusConfig::default())
    }

    /// Create a bus with explicit configuration.
    pub fn with_config(driver: D, config: BusConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                driver: RefCell::new(driver),
                registry: Rc::new(RefCell::new(Registry::default())),
                config,
            }),
        }
    }

    /// Register `device` under `key`.
    ///
    /// The returned handle owns the device; dropping it detaches. With the
    /// default [`crate::DuplicatePolicy::Reject`], attaching to a key that
    /// has a live device fails and leaves that device registered.
    pub fn attach<H: Device + 'static>(&self, key: RouteKey, device: H) -> Result<DeviceHandle<H>> {
        let device = Rc::new(RefCell::new(device));
        let shared: Rc<RefCell<dyn Device>> = device.clone();

        let token = self.inner.registry.borrow_mut().insert(
            key,
            Rc::downgrade(&shared),
            self.inner.config.duplicate_policy,
        )?;

        Ok(DeviceHandle::new(
            Registration::new(&self.inner.registry, key, token),
            device,
        ))
    }

    /// Remove whatever is registered under `key`. Detaching a free key is a no-op.
    ///
    /// Returns true if an entry was removed. The device's handle stays valid
    /// but reports `is_attached() == false`.
    pub fn detach(&self, key: RouteKey) -> bool {
        self.inner.registry.borrow_mut().remove(key)
    }

    /// True if a live device is registered under `key`.
    pub fn is_registered(&self, key: RouteKey) -> bool {
        self.inner.registry.borrow().contains(key)
    }

    /// Keys with a live device, sorted.
    pub fn registered_keys(&self) -> Vec<RouteKey> {
        self.inner.registry.borrow().keys()
    }

    /// Route one frame to its handler.
    ///
    /// No registry borrow is held while the handler runs, so the handler may
    /// attach, detach, or drop device handles, its own included.
    pub fn dispatch(&self, frame: &Frame) -> Dispatch {
        if frame.is_error() {
            debug!(%frame, "ignoring error frame");
            return Dispatch::ErrorFrame;
        }

        let key = frame.route_key();
        let handler = self.inner.registry.borrow().lookup(key);
        let Some(handler) = handler.and_then(|weak| weak.upgrade()) else {
            trace!(%key, %frame, "no device registered, dropping frame");
            return Dispatch::Unmatched;
        };

        let Ok(mut device) = handler.try_borrow_mut() else {
            warn!(%key, %frame, "device is already handling a frame, dropping frame");
            return Dispatch::Busy;
        };
        trace!(%key, %frame, "dispatching frame");
        device.on_receive(frame);
        Dispatch::Delivered
    }

    /// Drain the driver and dispatch every received frame.
    ///
    /// Stops when the driver reports no pending frame, or after
    /// `max_frames_per_update` frames when configured (zero means no
    /// limit). A receive error ends
    /// the pass; frames dispatched before it stay dispatched.
    pub fn update(&self) -> Result<UpdateStats> {
        let mut stats = UpdateStats::default();

        let limit = self.inner.config.frame_limit();
        loop {
            if limit.is_some_and(|limit| stats.received >= limit) {
                break;
            }

            // The driver borrow ends here, before any handler runs.
            let received = self.driver()?.receive()?;
            let Some(frame) = received else {
                break;
            };

            stats.received += 1;
            match self.dispatch(&frame) {
                Dispatch::Delivered => stats.delivered += 1,
                Dispatch::Unmatched | Dispatch::ErrorFrame | Dispatch::Busy => stats.dropped += 1,
            }
        }

        if stats.received > 0 {
            trace!(?stats, "update pass complete");
        }
        Ok(stats)
    }

    /// Hand a frame to the driver. No retry is attempted.
    pub fn send(&self, frame: &Frame) -> Result<()> {
        self.driver()?.send(frame).map_err(|err| {
            debug!(%frame, error = %err, "send failed");
            BusError::from(err)
        })
    }

    /// Router configuration.
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    fn driver(&self) -> Result<RefMut<'_, D>> {
        self.inner
            .driver
            .try_borrow_mut()
            .map_err(|_| BusError::DriverBusy)
    }
}
