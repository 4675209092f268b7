//! CAN driver abstraction.
//!
//! The physical bus is an injected capability: anything that can send a
//! frame and poll for a received one implements [`CanDriver`]. Controller
//! drivers (SocketCAN, bxCAN, FDCAN, ...) live outside this workspace.
//!
//! [`MemoryDriver`] is an in-process implementation for tests and
//! host-side simulation.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryDriver;
pub use traits::CanDriver;
