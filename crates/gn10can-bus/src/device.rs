use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use gn10can_frame::{Frame, RouteKey};

use crate::registry::Registration;

/// A frame handler attached to a bus.
///
/// `on_receive` runs synchronously inside [`crate::CanBus::update`] and must
/// not block: every frame queued behind it waits for it to return.
pub trait Device {
    /// Handle a frame addressed to this device's route key.
    fn on_receive(&mut self, frame: &Frame);
}

/// Owner of an attached device.
///
/// The registration lives exactly as long as the handle. Dropping the handle
/// detaches the device, after which frames for its key are dropped. This
/// holds even when the handle is dropped from inside a receive callback
/// during an update pass.
pub struct DeviceHandle<H> {
    // Declared first so the entry is removed before the device is released.
    registration: Registration,
    device: Rc<RefCell<H>>,
}

impl<H> DeviceHandle<H> {
    pub(crate) fn new(registration: Registration, device: Rc<RefCell<H>>) -> Self {
        Self {
            registration,
            device,
        }
    }

    /// Route key the device was attached under.
    pub fn key(&self) -> RouteKey {
        self.registration.key()
    }

    /// False once the key was detached explicitly or taken over by a replacement.
    pub fn is_attached(&self) -> bool {
        self.registration.is_attached()
    }

    /// Borrow the device.
    ///
    /// # Panics
    ///
    /// Panics if the device is currently inside its own `on_receive`.
    pub fn borrow(&self) -> Ref<'_, H> {
        self.device.borrow()
    }

    /// Mutably borrow the device.
    ///
    /// # Panics
    ///
    /// Panics if the device is currently borrowed, e.g. from inside its own `on_receive`.
    pub fn borrow_mut(&self) -> RefMut<'_, H> {
        self.device.borrow_mut()
    }

    /// Mutably borrow the device, failing instead of panicking.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, H>, BorrowMutError> {
        self.device.try_borrow_mut()
    }

    /// Detach and hand the device back.
    ///
    /// Returns `None` when the device cannot be released right now because
    /// its receive callback is executing; it is detached either way.
    pub fn close(self) -> Option<H> {
        let Self {
            registration,
            device,
        } = self;
        drop(registration);
        Rc::try_unwrap(device).ok().map(RefCell::into_inner)
    }
}

impl<H: fmt::Debug> fmt::Debug for DeviceHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("DeviceHandle");
        dbg.field("key", &self.key());
        match self.device.try_borrow() {
            Ok(device) => dbg.field("device", &*device),
            Err(_) => dbg.field("device", &format_args!("<in callback>")),
        };
        dbg.finish()
    }
}
