//! Volatile byte store
//!
//! Stands in for EEPROM on boards without one, and for bench setups where
//! every boot should look like a fresh unit.

use bull_hal::{ByteStore, StorageError, ERASED};

/// `N` bytes of RAM, erased at creation
pub struct RamStore<const N: usize> {
    cells: [u8; N],
    writes: u32,
}

impl<const N: usize> RamStore<N> {
    pub const fn new() -> Self {
        Self {
            cells: [ERASED; N],
            writes: 0,
        }
    }

    /// Start from existing contents
    pub const fn with_contents(cells: [u8; N]) -> Self {
        Self { cells, writes: 0 }
    }

    pub fn contents(&self) -> &[u8; N] {
        &self.cells
    }

    /// Single-byte writes since creation
    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn erase(&mut self) {
        self.cells = [ERASED; N];
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for RamStore<N> {
    fn read_byte(&mut self, offset: u8) -> Result<u8, StorageError> {
        self.cells
            .get(offset as usize)
            .copied()
            .ok_or(StorageError::OutOfRange)
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), StorageError> {
        let cell = self
            .cells
            .get_mut(offset as usize)
            .ok_or(StorageError::OutOfRange)?;
        // Unchanged cells are not rewritten
        if *cell != value {
            *cell = value;
            self.writes = self.writes.wrapping_add(1);
        }
        Ok(())
    }
}
