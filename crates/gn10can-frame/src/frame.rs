use std::fmt;

use crate::error::{FrameError, IdError, PayloadError, Result};
use crate::id::{self, DeviceType, IdFields, RouteKey, EXTENDED_ID_MAX, STANDARD_ID_MAX};
use crate::payload::{self, PayloadValue};

/// Payload capacity of a classic CAN frame.
pub const MAX_DLC: usize = 8;

/// Frame format and status flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameFlags {
    /// 29-bit identifier format.
    pub extended: bool,
    /// Remote transmission request.
    pub remote: bool,
    /// Error frame reported by the controller.
    pub error: bool,
}

/// A classic CAN frame.
///
/// The declared length is authoritative: bytes past it are kept zeroed and
/// take no part in equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    id: u32,
    data: [u8; MAX_DLC],
    len: u8,
    flags: FrameFlags,
}

impl Frame {
    /// Create a data frame.
    ///
    /// The extended flag is set when `id` does not fit an 11-bit identifier.
    pub fn new(id: u32, data: &[u8]) -> Result<Self> {
        if id > EXTENDED_ID_MAX {
            return Err(FrameError::InvalidIdentifier(id));
        }

        let mut frame = Self {
            id,
            flags: FrameFlags {
                extended: id > STANDARD_ID_MAX,
                ..FrameFlags::default()
            },
            ..Self::default()
        };
        frame.set_data(data)?;
        Ok(frame)
    }

    /// Create a data frame addressed by device type, instance and command.
    ///
    /// Packed identifiers always use the extended format.
    pub fn from_fields(
        device_type: DeviceType,
        device_id: u8,
        command: impl Into<u8>,
        data: &[u8],
    ) -> Result<Self> {
        let mut frame = Self::new(id::pack(device_type, device_id, command), data)?;
        frame.flags.extended = true;
        Ok(frame)
    }

    /// Create a remote-request frame asking for `len` bytes.
    pub fn remote(id: u32, len: usize) -> Result<Self> {
        if len > MAX_DLC {
            return Err(FrameError::DataTooLong { len, max: MAX_DLC });
        }
        let mut frame = Self::new(id, &[])?;
        frame.len = len as u8;
        frame.flags.remote = true;
        Ok(frame)
    }

    /// Replace the frame flags.
    ///
    /// Clearing the extended flag is rejected when the identifier needs 29 bits.
    pub fn with_flags(mut self, flags: FrameFlags) -> Result<Self> {
        if !flags.extended && self.id > STANDARD_ID_MAX {
            return Err(FrameError::InvalidIdentifier(self.id));
        }
        self.flags = flags;
        Ok(self)
    }

    /// Replace the payload, zero-filling the unused tail.
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_DLC {
            return Err(FrameError::DataTooLong {
                len: data.len(),
                max: MAX_DLC,
            });
        }
        self.data = [0; MAX_DLC];
        self.data[..data.len()].copy_from_slice(data);
        self.len = data.len() as u8;
        Ok(())
    }

    /// Pack a value at `offset`, growing the declared length to cover it.
    pub fn pack<T: PayloadValue>(&mut self, offset: usize, value: T) -> Result<()> {
        payload::pack(&mut self.data, offset, value)?;
        let end = offset + T::WIDTH;
        if end > self.len() {
            self.len = end as u8;
        }
        Ok(())
    }

    /// Read a value at `offset` within the declared length.
    pub fn unpack<T: PayloadValue>(&self, offset: usize) -> std::result::Result<T, PayloadError> {
        payload::unpack(&self.data, self.len(), offset)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The meaningful payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// The full payload buffer, including the zeroed tail.
    pub fn raw(&self) -> &[u8; MAX_DLC] {
        &self.data
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn flags(&self) -> FrameFlags {
        self.flags
    }

    pub fn is_extended(&self) -> bool {
        self.flags.extended
    }

    pub fn is_remote(&self) -> bool {
        self.flags.remote
    }

    pub fn is_error(&self) -> bool {
        self.flags.error
    }

    /// Decode the identifier fields.
    pub fn fields(&self) -> std::result::Result<IdFields, IdError> {
        id::unpack(self.id)
    }

    /// Registry key this frame is routed by.
    ///
    /// Only the identifier value counts. A standard frame and an extended
    /// frame with the same numeric identifier share a key; nodes using this
    /// layout are expected to send extended frames only.
    pub fn route_key(&self) -> RouteKey {
        RouteKey::from_identifier(self.id)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.len == other.len
            && self.flags == other.flags
            && self.data() == other.data()
    }
}

impl Eq for Frame {}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.extended {
            write!(f, "{:08X}", self.id)?;
        } else {
            write!(f, "{:03X}", self.id)?;
        }
        write!(f, " [{}]", self.len)?;
        if self.flags.remote {
            return f.write_str(" remote");
        }
        for byte in self.data() {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_zero_fills_tail() {
        let frame = Frame::new(0x123, &[1, 2, 3]).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.data(), &[1, 2, 3]);
        assert_eq!(frame.raw(), &[1, 2, 3, 0, 0, 0, 0, 0]);
        assert!(!frame.is_extended());
    }

    #[test]
    fn set_data_clears_previous_bytes() {
        let mut frame = Frame::new(0x10, &[9; 8]).unwrap();
        frame.set_data(&[7]).unwrap();
        assert_eq!(frame.raw(), &[7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rejects_oversized_data() {
        let err = Frame::new(0x10, &[0; 9]).unwrap_err();
        assert_eq!(err, FrameError::DataTooLong { len: 9, max: 8 });
        assert!(Frame::remote(0x10, 9).is_err());
    }

    #[test]
    fn rejects_identifier_outside_extended_range() {
        let err = Frame::new(0x2000_0000, &[]).unwrap_err();
        assert_eq!(err, FrameError::InvalidIdentifier(0x2000_0000));
    }

    #[test]
    fn extended_flag_follows_identifier_width() {
        assert!(!Frame::new(0x7FF, &[]).unwrap().is_extended());
        assert!(Frame::new(0x800, &[]).unwrap().is_extended());
        assert!(Frame::from_fields(DeviceType::Emergency, 0, 1u8, &[])
            .unwrap()
            .is_extended());
    }

    #[test]
    fn with_flags_keeps_wide_identifiers_extended() {
        let frame = Frame::new(0x1_0000, &[]).unwrap();
        assert!(frame.with_flags(FrameFlags::default()).is_err());

        let frame = Frame::new(0x100, &[]).unwrap();
        let flagged = frame
            .with_flags(FrameFlags {
                error: true,
                ..FrameFlags::default()
            })
            .unwrap();
        assert!(flagged.is_error());
    }

    #[test]
    fn equality_ignores_bytes_past_length() {
        let a = Frame::new(0x100, &[1, 2]).unwrap();
        let mut raw = [1u8, 2, 0xFF, 0xFF, 0, 0, 0, 0];
        let mut b = Frame::new(0x100, &raw).unwrap();
        b.len = 2;
        assert_eq!(a, b);

        raw[1] = 3;
        let c = Frame::new(0x100, &raw[..2]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn equality_compares_flags_and_length() {
        let a = Frame::new(0x100, &[]).unwrap();
        let b = Frame::remote(0x100, 0).unwrap();
        assert_ne!(a, b);

        let c = Frame::new(0x100, &[0]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn pack_grows_length_and_unpack_respects_it() {
        let mut frame = Frame::from_fields(DeviceType::MotorDriver, 1, 1u8, &[]).unwrap();
        frame.pack(0, 123.45f32).unwrap();
        assert_eq!(frame.len(), 4);
        frame.pack(4, 3u8).unwrap();
        assert_eq!(frame.len(), 5);
        frame.pack(0, 1.0f32).unwrap();
        assert_eq!(frame.len(), 5);

        assert_eq!(frame.unpack::<u8>(4), Ok(3));
        assert!(frame.unpack::<u8>(5).is_err());
        assert!(frame.pack(6, 1.0f32).is_err());
    }

    #[test]
    fn fields_and_route_key() {
        let frame = Frame::from_fields(DeviceType::SolenoidDriver, 4, 1u8, &[1]).unwrap();
        let fields = frame.fields().unwrap();
        assert_eq!(fields.device_type, DeviceType::SolenoidDriver);
        assert_eq!(fields.device_id, 4);
        assert!(fields.is_command(1u8));
        assert_eq!(frame.route_key(), RouteKey::new(DeviceType::SolenoidDriver, 4));
    }

    #[test]
    fn route_key_ignores_frame_format() {
        let standard = Frame::new(0x100, &[]).unwrap();
        let extended = standard
            .with_flags(FrameFlags {
                extended: true,
                ..FrameFlags::default()
            })
            .unwrap();

        assert!(!standard.is_extended());
        assert_ne!(standard, extended);
        assert_eq!(standard.route_key(), extended.route_key());
        assert_eq!(standard.route_key(), RouteKey::new(DeviceType::Emergency, 1));
    }

    #[test]
    fn display_like_candump() {
        let frame = Frame::new(0x123, &[0xDE, 0xAD]).unwrap();
        assert_eq!(frame.to_string(), "123 [2] DE AD");

        let frame = Frame::from_fields(DeviceType::MotorDriver, 1, 1u8, &[0x01]).unwrap();
        assert_eq!(frame.to_string(), "00010101 [1] 01");

        let frame = Frame::remote(0x42, 4).unwrap();
        assert_eq!(frame.to_string(), "042 [4] remote");
    }
}
