//! Device registry and frame router for gn10can.
//!
//! A [`CanBus`] owns one driver and a table of devices keyed by
//! [`RouteKey`](gn10can_frame::RouteKey), the `(device type, device id)` part
//! of an identifier. Each call to [`CanBus::update`] drains the driver and
//! hands every frame to the device registered for its key; frames for
//! unregistered keys are dropped, since the bus is shared.
//!
//! Registration is tied to ownership: [`CanBus::attach`] returns a
//! [`DeviceHandle`], and dropping the handle detaches the device. The
//! registry holds devices weakly and never borrows itself across a handler
//! call, so handles may be dropped or created from inside `on_receive`.

pub mod bus;
pub mod config;
pub mod device;
pub mod error;
mod registry;

pub use bus::{CanBus, Dispatch, UpdateStats};
pub use config::{BusConfig, DuplicatePolicy};
pub use device::{Device, DeviceHandle};
pub use error::{BusError, Result};
