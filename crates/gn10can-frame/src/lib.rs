//! Identifier layout, payload packing and frame type for gn10can.
//!
//! This is the wire contract shared by every node on the bus:
//! - A versioned identifier layout packing device type, device instance and
//!   command code into one CAN identifier
//! - Little-endian fixed-width scalar packing at byte offsets of the 8-byte payload
//! - A classic CAN [`Frame`] whose declared length is authoritative
//!
//! Nothing here touches hardware; see `gn10can-transport` for that boundary.

pub mod error;
pub mod frame;
pub mod id;
pub mod payload;

pub use error::{FrameError, IdError, PayloadError, Result};
pub use frame::{Frame, FrameFlags, MAX_DLC};
pub use id::{DeviceType, IdFields, RouteKey, ID_LAYOUT_VERSION};
pub use payload::PayloadValue;
