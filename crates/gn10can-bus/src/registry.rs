use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gn10can_frame::RouteKey;
use tracing::{debug, warn};

use crate::config::DuplicatePolicy;
use crate::device::Device;
use crate::error::{BusError, Result};

pub(crate) type WeakDevice = Weak<RefCell<dyn Device>>;

struct Entry {
    token: u64,
    device: WeakDevice,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.device.strong_count() > 0
    }
}

/// Route-key to handler table.
///
/// Handlers are held weakly; the owning [`crate::DeviceHandle`] keeps them
/// alive. Each entry carries a token so a stale [`Registration`] can never
/// remove an entry installed after it.
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<RouteKey, Entry>,
    next_token: u64,
}

impl Registry {
    pub(crate) fn insert(
        &mut self,
        key: RouteKey,
        device: WeakDevice,
        policy: DuplicatePolicy,
    ) -> Result<u64> {
        if let Some(existing) = self.entries.get(&key) {
            if existing.is_live() {
                match policy {
                    DuplicatePolicy::Reject => {
                        warn!(%key, "rejecting duplicate registration");
                        return Err(BusError::DuplicateRegistration { key });
                    }
                    DuplicatePolicy::Replace => {
                        debug!(%key, "replacing registered device");
                    }
                }
            }
        }

        let token = self.next_token;
        self.next_token += 1;
        self.entries.insert(key, Entry { token, device });
        debug!(%key, token, "device attached");
        Ok(token)
    }

    pub(crate) fn remove(&mut self, key: RouteKey) -> bool {
        let removed = self.entries.remove(&key).is_some();
        if removed {
            debug!(%key, "device detached");
        }
        removed
    }

    fn remove_token(&mut self, key: RouteKey, token: u64) -> bool {
        match self.entries.get(&key) {
            Some(entry) if entry.token == token => self.remove(key),
            _ => false,
        }
    }

    pub(crate) fn holds(&self, key: RouteKey, token: u64) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|entry| entry.token == token && entry.is_live())
    }

    pub(crate) fn lookup(&self, key: RouteKey) -> Option<WeakDevice> {
        self.entries.get(&key).map(|entry| entry.device.clone())
    }

    pub(crate) fn contains(&self, key: RouteKey) -> bool {
        self.entries.get(&key).is_some_and(Entry::is_live)
    }

    pub(crate) fn keys(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// Detaches its registry entry when dropped.
pub(crate) struct Registration {
    registry: Weak<RefCell<Registry>>,
    key: RouteKey,
    token: u64,
}

impl Registration {
    pub(crate) fn new(registry: &Rc<RefCell<Registry>>, key: RouteKey, token: u64) -> Self {
        Self {
            registry: Rc::downgrade(registry),
            key,
            token,
        }
    }

    pub(crate) fn key(&self) -> RouteKey {
        self.key
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .try_borrow()
                .is_ok_and(|registry| registry.holds(self.key, self.token))
        })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let borrowed = registry.try_borrow_mut();
        match borrowed {
            Ok(mut registry) => {
                registry.remove_token(self.key, self.token);
            }
            // The handler is held weakly, so a leftover entry is never dispatched to.
            Err(_) => warn!(key = %self.key, "registry busy, leaving dead entry"),
        }
    }
}
