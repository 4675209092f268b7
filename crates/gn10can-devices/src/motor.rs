//! Motor driver messages.
//!
//! The controller side ([`MotorDriverClient`]) sends setpoints and reads
//! telemetry; the actuator side ([`MotorDriverServer`]) does the reverse.
//!
//! | command    | code | payload                                    |
//! |------------|------|--------------------------------------------|
//! | `Init`     | 0    | [`MotorConfig`] record (8 bytes)           |
//! | `Target`   | 1    | f32 @0                                     |
//! | `Gain`     | 2    | u8 [`GainKind`] @0, f32 @1                 |
//! | `Feedback` | 3    | f32 value @0, u8 limit switch state @4     |
//! | `Status`   | 4    | f32 load current @0, i8 temperature @4     |

use gn10can_bus::{CanBus, Device, DeviceHandle, Result};
use gn10can_frame::{DeviceType, Frame, RouteKey};
use gn10can_transport::CanDriver;
use tracing::debug;

use crate::addressed_command;
use crate::error::DecodeError;
use crate::motor_config::{MotorConfig, MOTOR_CONFIG_LEN};

/// Motor driver command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MotorCommand {
    Init = 0,
    Target = 1,
    Gain = 2,
    Feedback = 3,
    Status = 4,
}

impl From<MotorCommand> for u8 {
    fn from(value: MotorCommand) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for MotorCommand {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(MotorCommand::Init),
            1 => Ok(MotorCommand::Target),
            2 => Ok(MotorCommand::Gain),
            3 => Ok(MotorCommand::Feedback),
            4 => Ok(MotorCommand::Status),
            other => Err(other),
        }
    }
}

/// Controller gain selected by the first byte of a `Gain` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GainKind {
    Kp = 0,
    Ki = 1,
    Kd = 2,
    Ff = 3,
}

impl GainKind {
    pub const ALL: [GainKind; 4] = [GainKind::Kp, GainKind::Ki, GainKind::Kd, GainKind::Ff];
}

impl From<GainKind> for u8 {
    fn from(value: GainKind) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for GainKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        GainKind::ALL
            .into_iter()
            .find(|kind| u8::from(*kind) == value)
            .ok_or(DecodeError::UnknownGainKind(value))
    }
}

/// Last `Feedback` report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorFeedback {
    pub value: f32,
    pub limit_switches: u8,
}

/// Last `Status` report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStatus {
    pub load_current: f32,
    pub temperature: i8,
}

fn motor_frame(device_id: u8, command: MotorCommand) -> Result<Frame> {
    Ok(Frame::from_fields(DeviceType::MotorDriver, device_id, command, &[])?)
}

/// Controller-side motor driver.
pub struct MotorDriverClient<D> {
    bus: CanBus<D>,
    device_id: u8,
    feedback: Option<MotorFeedback>,
    status: Option<MotorStatus>,
}

impl<D: CanDriver + 'static> MotorDriverClient<D> {
    /// Attach a client for motor driver `device_id`.
    pub fn attach(bus: &CanBus<D>, device_id: u8) -> Result<DeviceHandle<Self>> {
        let client = Self {
            bus: bus.clone(),
            device_id,
            feedback: None,
            status: None,
        };
        bus.attach(RouteKey::new(DeviceType::MotorDriver, device_id), client)
    }

    /// Send the configuration record.
    pub fn send_init(&self, config: &MotorConfig) -> Result<()> {
        let mut frame = motor_frame(self.device_id, MotorCommand::Init)?;
        frame.set_data(&config.to_bytes())?;
        self.bus.send(&frame)
    }

    /// Send a new setpoint.
    pub fn send_target(&self, target: f32) -> Result<()> {
        let mut frame = motor_frame(self.device_id, MotorCommand::Target)?;
        frame.pack(0, target)?;
        self.bus.send(&frame)
    }

    /// Send one controller gain.
    pub fn send_gain(&self, kind: GainKind, value: f32) -> Result<()> {
        let mut frame = motor_frame(self.device_id, MotorCommand::Gain)?;
        frame.pack(0, u8::from(kind))?;
        frame.pack(1, value)?;
        self.bus.send(&frame)
    }
}

impl<D> MotorDriverClient<D> {
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Most recent feedback, if any arrived.
    pub fn feedback(&self) -> Option<MotorFeedback> {
        self.feedback
    }

    /// Most recent status, if any arrived.
    pub fn status(&self) -> Option<MotorStatus> {
        self.status
    }

    fn handle(
        &mut self,
        command: MotorCommand,
        frame: &Frame,
    ) -> std::result::Result<(), DecodeError> {
        match command {
            MotorCommand::Feedback => {
                self.feedback = Some(MotorFeedback {
                    value: frame.unpack(0)?,
                    limit_switches: frame.unpack(4)?,
                });
            }
            MotorCommand::Status => {
                self.status = Some(MotorStatus {
                    load_current: frame.unpack(0)?,
                    temperature: frame.unpack(4)?,
                });
            }
            MotorCommand::Init | MotorCommand::Target | MotorCommand::Gain => {}
        }
        Ok(())
    }
}

impl<D> Device for MotorDriverClient<D> {
    fn on_receive(&mut self, frame: &Frame) {
        let Some(code) = addressed_command(frame, DeviceType::MotorDriver, self.device_id) else {
            return;
        };
        let Ok(command) = MotorCommand::try_from(code) else {
            debug!(code, device_id = self.device_id, "unknown motor command");
            return;
        };
        if let Err(err) = self.handle(command, frame) {
            debug!(?command, error = %err, %frame, "malformed motor frame");
        }
    }
}

/// Actuator-side motor driver.
///
/// Received values are held until taken, so the control loop sees each
/// message once.
pub struct MotorDriverServer<D> {
    bus: CanBus<D>,
    device_id: u8,
    config: Option<MotorConfig>,
    target: Option<f32>,
    gains: [Option<f32>; 4],
}

impl<D: CanDriver + 'static> MotorDriverServer<D> {
    /// Attach the actuator side for motor driver `device_id`.
    pub fn attach(bus: &CanBus<D>, device_id: u8) -> Result<DeviceHandle<Self>> {
        let server = Self {
            bus: bus.clone(),
            device_id,
            config: None,
            target: None,
            gains: [None; 4],
        };
        bus.attach(RouteKey::new(DeviceType::MotorDriver, device_id), server)
    }

    /// Report the measured value and limit switch state.
    pub fn send_feedback(&self, value: f32, limit_switches: u8) -> Result<()> {
        let mut frame = motor_frame(self.device_id, MotorCommand::Feedback)?;
        frame.pack(0, value)?;
        frame.pack(4, limit_switches)?;
        self.bus.send(&frame)
    }

    /// Report load current and temperature.
    pub fn send_status(&self, load_current: f32, temperature: i8) -> Result<()> {
        let mut frame = motor_frame(self.device_id, MotorCommand::Status)?;
        frame.pack(0, load_current)?;
        frame.pack(4, temperature)?;
        self.bus.send(&frame)
    }
}

impl<D> MotorDriverServer<D> {
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Configuration received since the last call.
    pub fn take_init(&mut self) -> Option<MotorConfig> {
        self.config.take()
    }

    /// Setpoint received since the last call.
    pub fn take_target(&mut self) -> Option<f32> {
        self.target.take()
    }

    /// Gain of `kind` received since the last call.
    pub fn take_gain(&mut self, kind: GainKind) -> Option<f32> {
        self.gains[usize::from(u8::from(kind))].take()
    }

    fn handle(
        &mut self,
        command: MotorCommand,
        frame: &Frame,
    ) -> std::result::Result<(), DecodeError> {
        match command {
            MotorCommand::Init => {
                let bytes = <[u8; MOTOR_CONFIG_LEN]>::try_from(frame.data()).map_err(|_| {
                    DecodeError::WrongLength {
                        expected: MOTOR_CONFIG_LEN,
                        actual: frame.len(),
                    }
                })?;
                self.config = Some(MotorConfig::from_bytes(&bytes)?);
            }
            MotorCommand::Target => {
                self.target = Some(frame.unpack(0)?);
            }
            MotorCommand::Gain => {
                let kind = GainKind::try_from(frame.unpack::<u8>(0)?)?;
                self.gains[usize::from(u8::from(kind))] = Some(frame.unpack(1)?);
            }
            MotorCommand::Feedback | MotorCommand::Status => {}
        }
        Ok(())
    }
}

impl<D> Device for MotorDriverServer<D> {
    fn on_receive(&mut self, frame: &Frame) {
        let Some(code) = addressed_command(frame, DeviceType::MotorDriver, self.device_id) else {
            return;
        };
        let Ok(command) = MotorCommand::try_from(code) else {
            debug!(code, device_id = self.device_id, "unknown motor command");
            return;
        };
        if let Err(err) = self.handle(command, frame) {
            debug!(?command, error = %err, %frame, "malformed motor frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use gn10can_frame::payload;
    use gn10can_transport::MemoryDriver;

    use super::*;

    fn setup() -> (MemoryDriver, CanBus<MemoryDriver>) {
        let driver = MemoryDriver::new();
        (driver.clone(), CanBus::new(driver))
    }

    #[test]
    fn send_target_packs_float_at_offset_zero() {
        let (driver, bus) = setup();
        let motor = MotorDriverClient::attach(&bus, 1).unwrap();

        motor.borrow().send_target(123.45).unwrap();

        let sent = driver.sent_frames();
        assert_eq!(sent.len(), 1);
        let frame = &sent[0];
        assert_eq!(frame.id(), 0x0001_0101);
        assert!(frame.is_extended());
        assert_eq!(frame.len(), 4);
        let target: f32 = payload::unpack(frame.raw(), frame.len(), 0).unwrap();
        assert_eq!(target.to_bits(), 123.45f32.to_bits());
        assert_eq!(&frame.raw()[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn send_gain_puts_kind_first() {
        let (driver, bus) = setup();
        let motor = MotorDriverClient::attach(&bus, 2).unwrap();

        motor.borrow().send_gain(GainKind::Kd, 0.25).unwrap();

        let frame = driver.sent_frames()[0];
        assert!(frame.fields().unwrap().is_command(MotorCommand::Gain));
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.data()[0], 2);
        assert_eq!(frame.unpack::<f32>(1), Ok(0.25));
    }

    #[test]
    fn send_init_carries_full_record() {
        let (driver, bus) = setup();
        let motor = MotorDriverClient::attach(&bus, 3).unwrap();
        let config = MotorConfig::new().with_telemetry_cycle(10);

        motor.borrow().send_init(&config).unwrap();

        let frame = driver.sent_frames()[0];
        assert_eq!(frame.len(), MOTOR_CONFIG_LEN);
        assert_eq!(frame.data(), &config.to_bytes());
    }

    #[test]
    fn client_records_feedback_and_status() {
        let (driver, bus) = setup();
        let motor = MotorDriverClient::attach(&bus, 1).unwrap();

        let mut feedback = motor_frame(1, MotorCommand::Feedback).unwrap();
        feedback.pack(0, 543.21f32).unwrap();
        feedback.pack(4, 1u8).unwrap();
        let mut status = motor_frame(1, MotorCommand::Status).unwrap();
        status.pack(0, 1.5f32).unwrap();
        status.pack(4, -12i8).unwrap();
        driver.push_receive_frame(feedback).unwrap();
        driver.push_receive_frame(status).unwrap();

        bus.update().unwrap();

        let client = motor.borrow();
        assert_eq!(
            client.feedback(),
            Some(MotorFeedback {
                value: 543.21,
                limit_switches: 1
            })
        );
        assert_eq!(
            client.status(),
            Some(MotorStatus {
                load_current: 1.5,
                temperature: -12
            })
        );
    }

    #[test]
    fn truncated_feedback_is_ignored() {
        let (driver, bus) = setup();
        let motor = MotorDriverClient::attach(&bus, 1).unwrap();

        let mut short = motor_frame(1, MotorCommand::Feedback).unwrap();
        short.pack(0, 1.0f32).unwrap();
        driver.push_receive_frame(short).unwrap();

        bus.update().unwrap();
        assert_eq!(motor.borrow().feedback(), None);
    }

    #[test]
    fn server_takes_each_value_once() {
        let (driver, bus) = setup();
        let server = MotorDriverServer::attach(&bus, 4).unwrap();

        let mut target = motor_frame(4, MotorCommand::Target).unwrap();
        target.pack(0, -3.5f32).unwrap();
        let mut gain = motor_frame(4, MotorCommand::Gain).unwrap();
        gain.pack(0, u8::from(GainKind::Ki)).unwrap();
        gain.pack(1, 0.01f32).unwrap();
        driver.push_receive_frame(target).unwrap();
        driver.push_receive_frame(gain).unwrap();

        bus.update().unwrap();

        let mut server = server.borrow_mut();
        assert_eq!(server.take_target(), Some(-3.5));
        assert_eq!(server.take_target(), None);
        assert_eq!(server.take_gain(GainKind::Ki), Some(0.01));
        assert_eq!(server.take_gain(GainKind::Kp), None);
    }

    #[test]
    fn server_rejects_unknown_gain_kind() {
        let (driver, bus) = setup();
        let server = MotorDriverServer::attach(&bus, 4).unwrap();

        let mut gain = motor_frame(4, MotorCommand::Gain).unwrap();
        gain.pack(0, 9u8).unwrap();
        gain.pack(1, 1.0f32).unwrap();
        driver.push_receive_frame(gain).unwrap();

        bus.update().unwrap();
        let mut server = server.borrow_mut();
        assert!(GainKind::ALL.iter().all(|kind| server.take_gain(*kind).is_none()));
    }

    #[test]
    fn server_sends_status() {
        let (driver, bus) = setup();
        let server = MotorDriverServer::attach(&bus, 4).unwrap();

        server.borrow().send_status(2.5, -5).unwrap();

        let frame = driver.sent_frames()[0];
        assert!(frame.fields().unwrap().is_command(MotorCommand::Status));
        assert_eq!(frame.unpack::<f32>(0), Ok(2.5));
        assert_eq!(frame.unpack::<i8>(4), Ok(-5));
    }
}
