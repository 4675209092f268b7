//! CAN bus messaging for robot controllers and their device drivers.
//!
//! gn10can defines how the controller and its motor, servo and solenoid
//! drivers talk over a shared CAN bus: one identifier layout, one payload
//! byte order, and a router that hands each received frame to the device
//! it addresses.
//!
//! # Crate Structure
//!
//! - [`frame`]: identifier layout, payload packing and the [`frame::Frame`] type
//! - [`transport`]: the [`transport::CanDriver`] boundary and an in-memory driver
//! - [`bus`]: device registry and frame router with drop-to-detach handles
//! - [`devices`]: motor and solenoid driver messages (behind `devices` feature)

/// Re-export frame types.
pub mod frame {
    pub use gn10can_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use gn10can_transport::*;
}

/// Re-export bus types.
pub mod bus {
    pub use gn10can_bus::*;
}

/// Re-export device types (requires `devices` feature).
#[cfg(feature = "devices")]
pub mod devices {
    pub use gn10can_devices::*;
}
