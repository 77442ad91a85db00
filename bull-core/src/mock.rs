//! Mock collaborators for unit tests

use bull_hal::storage::ERASED;
use bull_hal::{ByteStore, NoiseSource, StorageError};

use crate::traits::{Board, DeviceId, OneWireError, OneWireNetwork, PixelChain, Status};

pub const STORE_SIZE: usize = 64;

pub struct MockStore {
    pub cells: [u8; STORE_SIZE],
    pub writes: usize,
    pub fail_writes: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            cells: [ERASED; STORE_SIZE],
            writes: 0,
            fail_writes: false,
        }
    }
}

impl ByteStore for MockStore {
    fn read_byte(&mut self, offset: u8) -> Result<u8, StorageError> {
        self.cells
            .get(offset as usize)
            .copied()
            .ok_or(StorageError::OutOfRange)
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed);
        }
        let cell = self
            .cells
            .get_mut(offset as usize)
            .ok_or(StorageError::OutOfRange)?;
        *cell = value;
        self.writes += 1;
        Ok(())
    }
}

pub struct MockNoise {
    next: u16,
    pub samples_taken: usize,
}

impl MockNoise {
    pub fn new(seed: u16) -> Self {
        Self {
            next: seed,
            samples_taken: 0,
        }
    }
}

impl NoiseSource for MockNoise {
    fn sample(&mut self) -> u16 {
        self.samples_taken += 1;
        self.next = self.next.wrapping_mul(75).wrapping_add(74);
        self.next
    }
}

#[derive(Default)]
pub struct MockOneWire {
    pub present: bool,
    pub devices: Vec<DeviceId>,
    pub written_bits: Vec<bool>,
    pub line_bit: bool,
    pub temperature: i16,
    pub temperature_requests: Vec<Option<DeviceId>>,
}

impl OneWireNetwork for MockOneWire {
    fn reset(&mut self) -> bool {
        self.present
    }

    fn write_bit(&mut self, bit: bool) {
        self.written_bits.push(bit);
    }

    fn read_bit(&mut self) -> bool {
        self.line_bit
    }

    fn search_next(&mut self, discrepancy: &mut u64) -> Result<DeviceId, OneWireError> {
        if !self.present {
            return Err(OneWireError::NoPresence);
        }
        // Devices are listed in enumeration order; the mask counts the
        // ones still to come.
        let index = if *discrepancy == 0 {
            0
        } else {
            self.devices.len() - *discrepancy as usize
        };
        let id = *self.devices.get(index).ok_or(OneWireError::SearchFailed)?;
        *discrepancy = (self.devices.len() - index - 1) as u64;
        Ok(id)
    }

    fn read_temperature(&mut self, device: Option<DeviceId>) -> i16 {
        self.temperature_requests.push(device);
        self.temperature
    }
}

#[derive(Default)]
pub struct MockPixels {
    pub colors: Vec<(u8, u8, u8)>,
}

impl PixelChain for MockPixels {
    fn write_color(&mut self, red: u8, green: u8, blue: u8) {
        self.colors.push((red, green, blue));
    }
}

pub struct MockBoard {
    pub store: MockStore,
    pub onewire: MockOneWire,
    pub pixels: MockPixels,
    pub counter: u8,
    pub bootloader_attempts: usize,
    pub announcements: Vec<Status>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            store: MockStore::new(),
            onewire: MockOneWire::default(),
            pixels: MockPixels::default(),
            counter: 0,
            bootloader_attempts: 0,
            announcements: Vec::new(),
        }
    }
}

impl Board for MockBoard {
    type Store = MockStore;
    type OneWire = MockOneWire;
    type Pixels = MockPixels;

    fn store(&mut self) -> &mut MockStore {
        &mut self.store
    }

    fn onewire(&mut self) -> &mut MockOneWire {
        &mut self.onewire
    }

    fn pixels(&mut self) -> &mut MockPixels {
        &mut self.pixels
    }

    fn counter(&mut self) -> u8 {
        self.counter = self.counter.wrapping_add(37);
        self.counter
    }

    fn enter_bootloader(&mut self) {
        self.bootloader_attempts += 1;
    }

    fn announce(&mut self, status: Status) {
        self.announcements.push(status);
    }
}
