//! Solenoid driver messages.
//!
//! | command    | code | payload     |
//! |------------|------|-------------|
//! | `Target`   | 0    | bool @0     |
//! | `Feedback` | 1    | bool @0     |

use gn10can_bus::{CanBus, Device, DeviceHandle, Result};
use gn10can_frame::{DeviceType, Frame, RouteKey};
use gn10can_transport::CanDriver;
use tracing::debug;

use crate::addressed_command;

/// Solenoid driver command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SolenoidCommand {
    Target = 0,
    Feedback = 1,
}

impl From<SolenoidCommand> for u8 {
    fn from(value: SolenoidCommand) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SolenoidCommand {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(SolenoidCommand::Target),
            1 => Ok(SolenoidCommand::Feedback),
            other => Err(other),
        }
    }
}

fn solenoid_frame(device_id: u8, command: SolenoidCommand, on: bool) -> Result<Frame> {
    let mut frame = Frame::from_fields(DeviceType::SolenoidDriver, device_id, command, &[])?;
    frame.pack(0, on)?;
    Ok(frame)
}

/// Controller-side solenoid driver.
pub struct SolenoidDriverClient<D> {
    bus: CanBus<D>,
    device_id: u8,
    feedback: Option<bool>,
}

impl<D: CanDriver + 'static> SolenoidDriverClient<D> {
    pub fn attach(bus: &CanBus<D>, device_id: u8) -> Result<DeviceHandle<Self>> {
        let client = Self {
            bus: bus.clone(),
            device_id,
            feedback: None,
        };
        bus.attach(RouteKey::new(DeviceType::SolenoidDriver, device_id), client)
    }

    /// Command the solenoid on or off.
    pub fn set_target(&self, on: bool) -> Result<()> {
        self.bus.send(&solenoid_frame(self.device_id, SolenoidCommand::Target, on)?)
    }
}

impl<D> SolenoidDriverClient<D> {
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Last reported state, `None` until the first feedback frame.
    pub fn feedback_value(&self) -> Option<bool> {
        self.feedback
    }
}

impl<D> Device for SolenoidDriverClient<D> {
    fn on_receive(&mut self, frame: &Frame) {
        let Some(code) = addressed_command(frame, DeviceType::SolenoidDriver, self.device_id) else {
            return;
        };
        if code != u8::from(SolenoidCommand::Feedback) {
            return;
        }
        match frame.unpack::<bool>(0) {
            Ok(on) => self.feedback = Some(on),
            Err(err) => debug!(error = %err, %frame, "malformed solenoid feedback"),
        }
    }
}

/// Actuator-side solenoid driver.
pub struct SolenoidDriverServer<D> {
    bus: CanBus<D>,
    device_id: u8,
    target: Option<bool>,
}

impl<D: CanDriver + 'static> SolenoidDriverServer<D> {
    pub fn attach(bus: &CanBus<D>, device_id: u8) -> Result<DeviceHandle<Self>> {
        let server = Self {
            bus: bus.clone(),
            device_id,
            target: None,
        };
        bus.attach(RouteKey::new(DeviceType::SolenoidDriver, device_id), server)
    }

    /// Report the actual solenoid state.
    pub fn send_feedback(&self, on: bool) -> Result<()> {
        self.bus.send(&solenoid_frame(self.device_id, SolenoidCommand::Feedback, on)?)
    }
}

impl<D> SolenoidDriverServer<D> {
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Target received since the last call.
    pub fn take_target(&mut self) -> Option<bool> {
        self.target.take()
    }
}

impl<D> Device for SolenoidDriverServer<D> {
    fn on_receive(&mut self, frame: &Frame) {
        let Some(code) = addressed_command(frame, DeviceType::SolenoidDriver, self.device_id) else {
            return;
        };
        if code != u8::from(SolenoidCommand::Target) {
            return;
        }
        match frame.unpack::<bool>(0) {
            Ok(on) => self.target = Some(on),
            Err(err) => debug!(error = %err, %frame, "malformed solenoid target"),
        }
    }
}
