//! Motor driver configuration record sent with the `Init` command.
//!
//! Wire layout, one byte per field, order fixed:
//!
//! ```text
//! byte 0  max duty ratio      0 = 0 %, 255 = 100 %
//! byte 1  max accel rate      duty change per ms, 255 = immediate
//! byte 2  telemetry cycle     ms between feedback frames, 0 = off
//! byte 3  encoder type        see EncoderType
//! byte 4  limit switches      [StopFwd:1 | FwdId:3 | StopBwd:1 | BwdId:3]
//! byte 5  user option
//! byte 6  reserved (0)
//! byte 7  reserved (0)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Encoded size of [`MotorConfig`].
pub const MOTOR_CONFIG_LEN: usize = 8;

/// Encoder attached to the motor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EncoderType {
    #[default]
    None = 0,
    IncrementalSpeed = 1,
    Absolute = 2,
    IncrementalTotal = 3,
}

impl From<EncoderType> for u8 {
    fn from(value: EncoderType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for EncoderType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncoderType::None),
            1 => Ok(EncoderType::IncrementalSpeed),
            2 => Ok(EncoderType::Absolute),
            3 => Ok(EncoderType::IncrementalTotal),
            other => Err(DecodeError::UnknownEncoderType(other)),
        }
    }
}

/// Limit switch wiring and stop behavior.
///
/// Switch ids are 3 bits wide; larger values are masked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSwitchConfig {
    /// Stop when the forward switch triggers.
    pub forward_stop: bool,
    pub forward_id: u8,
    /// Stop when the backward switch triggers.
    pub backward_stop: bool,
    pub backward_id: u8,
}

impl LimitSwitchConfig {
    const FORWARD_STOP: u8 = 1 << 7;
    const FORWARD_ID_SHIFT: u8 = 4;
    const BACKWARD_STOP: u8 = 1 << 3;
    const ID_MASK: u8 = 0x07;

    pub fn to_bits(&self) -> u8 {
        let mut bits = 0;
        if self.forward_stop {
            bits |= Self::FORWARD_STOP;
        }
        bits |= (self.forward_id & Self::ID_MASK) << Self::FORWARD_ID_SHIFT;
        if self.backward_stop {
            bits |= Self::BACKWARD_STOP;
        }
        bits | (self.backward_id & Self::ID_MASK)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            forward_stop: bits & Self::FORWARD_STOP != 0,
            forward_id: (bits >> Self::FORWARD_ID_SHIFT) & Self::ID_MASK,
            backward_stop: bits & Self::BACKWARD_STOP != 0,
            backward_id: bits & Self::ID_MASK,
        }
    }
}

/// The `Init` payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotorConfig {
    max_duty: u8,
    max_accel: u8,
    telemetry_cycle_ms: u8,
    encoder_type: EncoderType,
    limit_switches: LimitSwitchConfig,
    user_option: u8,
}

impl MotorConfig {
    /// All-zero configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum duty cycle as a ratio, clamped to `0.0..=1.0`.
    pub fn with_max_duty_ratio(mut self, ratio: f32) -> Self {
        self.max_duty = ratio_to_u8(ratio);
        self
    }

    /// Maximum acceleration, from 0.0 (slowest) to 1.0 (immediate).
    pub fn with_accel_ratio(mut self, ratio: f32) -> Self {
        self.max_accel = ratio_to_u8(ratio);
        self
    }

    /// Feedback period in milliseconds. Zero disables telemetry.
    pub fn with_telemetry_cycle(mut self, ms: u8) -> Self {
        self.telemetry_cycle_ms = ms;
        self
    }

    pub fn with_encoder_type(mut self, encoder_type: EncoderType) -> Self {
        self.encoder_type = encoder_type;
        self
    }

    pub fn with_limit_switches(mut self, limit_switches: LimitSwitchConfig) -> Self {
        self.limit_switches = LimitSwitchConfig::from_bits(limit_switches.to_bits());
        self
    }

    pub fn with_user_option(mut self, option: u8) -> Self {
        self.user_option = option;
        self
    }

    pub fn max_duty_raw(&self) -> u8 {
        self.max_duty
    }

    pub fn max_duty_ratio(&self) -> f32 {
        f32::from(self.max_duty) / 255.0
    }

    pub fn max_accel_raw(&self) -> u8 {
        self.max_accel
    }

    pub fn telemetry_cycle_ms(&self) -> u8 {
        self.telemetry_cycle_ms
    }

    pub fn encoder_type(&self) -> EncoderType {
        self.encoder_type
    }

    pub fn limit_switches(&self) -> LimitSwitchConfig {
        self.limit_switches
    }

    pub fn user_option(&self) -> u8 {
        self.user_option
    }

    /// Encode in wire order.
    pub fn to_bytes(&self) -> [u8; MOTOR_CONFIG_LEN] {
        [
            self.max_duty,
            self.max_accel,
            self.telemetry_cycle_ms,
            u8::from(self.encoder_type),
            self.limit_switches.to_bits(),
            self.user_option,
            0,
            0,
        ]
    }

    /// Decode from wire order. Reserved bytes are ignored.
    pub fn from_bytes(bytes: &[u8; MOTOR_CONFIG_LEN]) -> Result<Self, DecodeError> {
        Ok(Self {
            max_duty: bytes[0],
            max_accel: bytes[1],
            telemetry_cycle_ms: bytes[2],
            encoder_type: EncoderType::try_from(bytes[3])?,
            limit_switches: LimitSwitchConfig::from_bits(bytes[4]),
            user_option: bytes[5],
        })
    }
}

/// Human-facing motor settings, loadable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotorSettings {
    pub max_duty_ratio: f32,
    pub accel_ratio: f32,
    pub telemetry_cycle_ms: u8,
    pub encoder: EncoderType,
    pub limit_switches: LimitSwitchConfig,
    pub user_option: u8,
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self {
            max_duty_ratio: 1.0,
            accel_ratio: 1.0,
            telemetry_cycle_ms: 0,
            encoder: EncoderType::None,
            limit_switches: LimitSwitchConfig::default(),
            user_option: 0,
        }
    }
}

impl From<MotorSettings> for MotorConfig {
    fn from(settings: MotorSettings) -> Self {
        MotorConfig::new()
            .with_max_duty_ratio(settings.max_duty_ratio)
            .with_accel_ratio(settings.accel_ratio)
            .with_telemetry_cycle(settings.telemetry_cycle_ms)
            .with_encoder_type(settings.encoder)
            .with_limit_switches(settings.limit_switches)
            .with_user_option(settings.user_option)
    }
}

fn ratio_to_u8(ratio: f32) -> u8 {
    if ratio <= 0.0 || ratio.is_nan() {
        0
    } else if ratio >= 1.0 {
        u8::MAX
    } else {
        (ratio * 255.0) as u8
    }
}
