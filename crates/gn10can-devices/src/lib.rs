//! Device message sets for gn10can.
//!
//! Each device type comes in two halves sharing one route key: a client for
//! the controller that commands the device, and a server for the firmware
//! side that executes commands and reports back. Both attach to a
//! [`CanBus`](gn10can_bus::CanBus) and stay registered while their
//! [`DeviceHandle`](gn10can_bus::DeviceHandle) lives.
//!
//! Handlers never fail loudly: frames with an unknown command or a short
//! payload are logged at debug level and ignored.

pub mod error;
pub mod motor;
pub mod motor_config;
pub mod solenoid;

pub use error::DecodeError;
pub use motor::{
    GainKind, MotorCommand, MotorDriverClient, MotorDriverServer, MotorFeedback, MotorStatus,
};
pub use motor_config::{
    EncoderType, LimitSwitchConfig, MotorConfig, MotorSettings, MOTOR_CONFIG_LEN,
};
pub use solenoid::{SolenoidCommand, SolenoidDriverClient, SolenoidDriverServer};

use gn10can_frame::{DeviceType, Frame};

/// Command code of `frame` if it is addressed to `(device_type, device_id)`.
pub(crate) fn addressed_command(
    frame: &Frame,
    device_type: DeviceType,
    device_id: u8,
) -> Option<u8> {
    let fields = frame.fields().ok()?;
    (fields.device_type == device_type && fields.device_id == device_id).then_some(fields.command)
}
