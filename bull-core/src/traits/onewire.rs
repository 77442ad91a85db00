//! 1-Wire network trait

/// 64-bit 1-Wire ROM id (family code in the low byte)
pub type DeviceId = u64;

/// Errors from 1-Wire network operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneWireError {
    /// No device answered the reset pulse
    NoPresence,
    /// Devices stopped answering during a ROM search
    SearchFailed,
}

impl OneWireError {
    /// Id reported on the bus in place of a device
    pub fn sentinel(self) -> DeviceId {
        match self {
            OneWireError::NoPresence => 0xFFFF_FFFF_FFFF_FFFF,
            OneWireError::SearchFailed => 0xFFFF_FFFF_FFFF_FFFE,
        }
    }
}

/// A 1-Wire network of temperature sensors
pub trait OneWireNetwork {
    /// Reset pulse; `true` if any device is present
    fn reset(&mut self) -> bool;

    /// Write one raw bit slot
    fn write_bit(&mut self, bit: bool);

    /// Read one raw bit slot
    fn read_bit(&mut self) -> bool;

    /// Find the next device in ROM search order
    ///
    /// `discrepancy` carries the search position between calls: start
    /// with 0; it is 0 again after the last device.
    fn search_next(&mut self, discrepancy: &mut u64) -> Result<DeviceId, OneWireError>;

    /// Convert and read a raw temperature (1/16 °C)
    ///
    /// Addresses `device` if given, otherwise every device on the line.
    fn read_temperature(&mut self, device: Option<DeviceId>) -> i16;
}
