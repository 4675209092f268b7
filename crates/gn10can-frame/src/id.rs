//! Message identifier layout.
//!
//! Every peer on the bus packs identifiers with the same field widths. The
//! layout is versioned by [`ID_LAYOUT_VERSION`]; peers built against a
//! different version must not share a bus.
//!
//! ```text
//!  28        20 19       16 15           8 7            0
//! ┌────────────┬───────────┬──────────────┬──────────────┐
//! │ reserved   │ type      │ device id    │ command      │
//! │ (zero)     │ (4 bits)  │ (8 bits)     │ (8 bits)     │
//! └────────────┴───────────┴──────────────┴──────────────┘
//! ```
//!
//! A packed identifier is 20 bits wide, so it is always sent in the
//! extended (29-bit) frame format.

use std::fmt;

use crate::error::IdError;

/// Version of the identifier layout documented above.
pub const ID_LAYOUT_VERSION: u8 = 1;

/// Width of the command field.
pub const COMMAND_BITS: u32 = 8;
/// Width of the device instance field.
pub const DEVICE_ID_BITS: u32 = 8;
/// Width of the device type field.
pub const DEVICE_TYPE_BITS: u32 = 4;

pub const COMMAND_SHIFT: u32 = 0;
pub const DEVICE_ID_SHIFT: u32 = COMMAND_SHIFT + COMMAND_BITS;
pub const DEVICE_TYPE_SHIFT: u32 = DEVICE_ID_SHIFT + DEVICE_ID_BITS;

/// Total number of identifier bits used by the layout.
pub const LAYOUT_BITS: u32 = DEVICE_TYPE_SHIFT + DEVICE_TYPE_BITS;

const COMMAND_MASK: u32 = (1 << COMMAND_BITS) - 1;
const DEVICE_ID_MASK: u32 = (1 << DEVICE_ID_BITS) - 1;
const DEVICE_TYPE_MASK: u32 = (1 << DEVICE_TYPE_BITS) - 1;

/// Largest identifier of a standard (11-bit) frame.
pub const STANDARD_ID_MAX: u32 = 0x7FF;
/// Largest identifier of an extended (29-bit) frame.
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

const _: () = assert!(LAYOUT_BITS <= 29);

/// Kinds of devices that can be addressed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DeviceType {
    Emergency = 0,
    MotorDriver = 1,
    ServoDriver = 2,
    SolenoidDriver = 3,
}

impl DeviceType {
    /// Every known device type, in tag order.
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Emergency,
        DeviceType::MotorDriver,
        DeviceType::ServoDriver,
        DeviceType::SolenoidDriver,
    ];

    /// Returns a human-readable name for the device type.
    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Emergency => "EMERGENCY",
            DeviceType::MotorDriver => "MOTOR_DRIVER",
            DeviceType::ServoDriver => "SERVO_DRIVER",
            DeviceType::SolenoidDriver => "SOLENOID_DRIVER",
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(value: DeviceType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for DeviceType {
    type Error = IdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DeviceType::ALL
            .into_iter()
            .find(|kind| u8::from(*kind) == value)
            .ok_or(IdError::UnknownDeviceType(value))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded identifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdFields {
    pub device_type: DeviceType,
    pub device_id: u8,
    pub command: u8,
}

impl IdFields {
    /// True if the command field equals `expected`.
    pub fn is_command(&self, expected: impl Into<u8>) -> bool {
        self.command == expected.into()
    }

    /// Pack the fields back into an identifier.
    pub fn to_identifier(&self) -> u32 {
        pack(self.device_type, self.device_id, self.command)
    }

    /// Routing key of the addressed device.
    pub fn route_key(&self) -> RouteKey {
        RouteKey::new(self.device_type, self.device_id)
    }
}

/// Pack a device type, device instance and command code into an identifier.
pub fn pack(device_type: DeviceType, device_id: u8, command: impl Into<u8>) -> u32 {
    let device_type = u32::from(u8::from(device_type)) & DEVICE_TYPE_MASK;
    let device_id = u32::from(device_id) & DEVICE_ID_MASK;
    let command = u32::from(command.into()) & COMMAND_MASK;

    (device_type << DEVICE_TYPE_SHIFT) | (device_id << DEVICE_ID_SHIFT) | (command << COMMAND_SHIFT)
}

/// Unpack an identifier into its fields.
///
/// Fails when bits above the layout are set or when the type tag is not a
/// known [`DeviceType`].
pub fn unpack(identifier: u32) -> Result<IdFields, IdError> {
    if identifier >> LAYOUT_BITS != 0 {
        return Err(IdError::OutOfRange(identifier));
    }

    let type_tag = ((identifier >> DEVICE_TYPE_SHIFT) & DEVICE_TYPE_MASK) as u8;
    Ok(IdFields {
        device_type: DeviceType::try_from(type_tag)?,
        device_id: ((identifier >> DEVICE_ID_SHIFT) & DEVICE_ID_MASK) as u8,
        command: ((identifier >> COMMAND_SHIFT) & COMMAND_MASK) as u8,
    })
}

/// Registry key addressing one device instance.
///
/// Derived from an identifier by dropping the command field, so a device
/// receives every command addressed to its `(type, id)` pair. Raw
/// identifiers that were not produced by [`pack`] still map to a key.
///
/// The key carries no frame format bit: standard identifier `0x100` and
/// extended identifier `0x00100` map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteKey(u32);

impl RouteKey {
    /// Key for a device type and instance.
    pub fn new(device_type: DeviceType, device_id: u8) -> Self {
        Self::from_identifier(pack(device_type, device_id, 0u8))
    }

    /// Key for whatever device an identifier addresses.
    pub const fn from_identifier(identifier: u32) -> Self {
        Self(identifier >> DEVICE_ID_SHIFT)
    }

    /// Identifier of this key with a zero command field.
    pub const fn base_identifier(&self) -> u32 {
        self.0 << DEVICE_ID_SHIFT
    }

    /// True if `identifier` addresses this key.
    pub const fn matches(&self, identifier: u32) -> bool {
        identifier >> DEVICE_ID_SHIFT == self.0
    }
}

impl From<IdFields> for RouteKey {
    fn from(fields: IdFields) -> Self {
        fields.route_key()
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.base_identifier())
    }
}
