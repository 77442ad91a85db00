//! Non-volatile byte storage abstractions
//!
//! Units keep a handful of bytes across power cycles in an EEPROM-like
//! store addressed by small integer offset. The layout is fixed:
//!
//! ```text
//! 0x00        unit address
//! 0x01..0x0F  unit name (15 bytes)
//! 0x20..0x2F  stored byte registers (parameters 0x10..0x1F)
//! ```

/// Regions of the byte store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageRegion {
    /// Bus address of the unit
    Address,
    /// Free-form unit name
    Name,
    /// General purpose byte registers
    Registers,
}

impl StorageRegion {
    /// First offset of the region
    pub const fn offset(self) -> u8 {
        match self {
            StorageRegion::Address => 0x00,
            StorageRegion::Name => 0x01,
            StorageRegion::Registers => 0x20,
        }
    }

    /// Size of the region in bytes
    pub const fn len(self) -> u8 {
        match self {
            StorageRegion::Address => 1,
            StorageRegion::Name => 15,
            StorageRegion::Registers => 16,
        }
    }

    /// Offset of byte `index` within the region, if it fits
    pub fn at(self, index: u8) -> Option<u8> {
        if index < self.len() {
            Some(self.offset() + index)
        } else {
            None
        }
    }
}

/// Value an erased cell reads back as
pub const ERASED: u8 = 0xFF;

/// Errors from byte store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Offset outside the store
    OutOfRange,
    /// The device rejected or failed the write
    WriteFailed,
}

/// Offset-addressed non-volatile byte store
///
/// Implementations should busy-wait for any pending write before
/// starting a new operation.
pub trait ByteStore {
    /// Read one byte
    fn read_byte(&mut self, offset: u8) -> Result<u8, StorageError>;

    /// Write one byte
    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), StorageError>;

    /// Read `buffer.len()` consecutive bytes starting at `offset`
    fn read_block(&mut self, offset: u8, buffer: &mut [u8]) -> Result<(), StorageError> {
        for (i, slot) in buffer.iter_mut().enumerate() {
            let at = offset_plus(offset, i)?;
            *slot = self.read_byte(at)?;
        }
        Ok(())
    }

    /// Write `data` to consecutive bytes starting at `offset`
    fn write_block(&mut self, offset: u8, data: &[u8]) -> Result<(), StorageError> {
        for (i, &value) in data.iter().enumerate() {
            let at = offset_plus(offset, i)?;
            self.write_byte(at, value)?;
        }
        Ok(())
    }
}

fn offset_plus(offset: u8, i: usize) -> Result<u8, StorageError> {
    u8::try_from(i)
        .ok()
        .and_then(|i| offset.checked_add(i))
        .ok_or(StorageError::OutOfRange)
}
