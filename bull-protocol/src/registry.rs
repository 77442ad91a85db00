//! Commands, parameters and destinations of the bull bus
//!
//! The command byte selects read or write; bit 0x80 marks a write of the
//! same parameter. The parameter byte selects a logical register:
//!
//! | Param     | Register                  | Access |
//! |-----------|---------------------------|--------|
//! | 0x01      | Unit address              | R/W    |
//! | 0x02      | Unit name (15 bytes)      | R/W    |
//! | 0x03      | Quiet mode                | W      |
//! | 0x04      | Programming mode          | W      |
//! | 0x05      | Clock, seconds (u32 LE)   | R/W    |
//! | 0x06      | Firmware version          | R      |
//! | 0x07      | Pixel chain colors        | W      |
//! | 0x08      | Address search            | R/W    |
//! | 0x10-0x1F | Stored byte registers     | R/W    |
//! | 0x20      | 1-Wire reset              | W      |
//! | 0x21      | 1-Wire ROM search         | R/W    |
//! | 0x22      | 1-Wire temperature        | R      |
//! | 0x23      | 1-Wire raw bit            | R/W    |

use crate::frame::BROADCAST_ADDRESS;

// Command bytes
pub const CMD_READ: u8 = 0x01;
pub const CMD_WRITE: u8 = 0x81;
pub const CMD_ERROR: u8 = 0xFF;

// Parameter bytes
pub const PARAM_NONE: u8 = 0x00;
pub const PARAM_ADDRESS: u8 = 0x01;
pub const PARAM_NAME: u8 = 0x02;
pub const PARAM_QUIET: u8 = 0x03;
pub const PARAM_PROGRAMMING: u8 = 0x04;
pub const PARAM_CLOCK: u8 = 0x05;
pub const PARAM_VERSION: u8 = 0x06;
pub const PARAM_PIXELS: u8 = 0x07;
pub const PARAM_SEARCH: u8 = 0x08;
pub const PARAM_STORED_FIRST: u8 = 0x10;
pub const PARAM_STORED_LAST: u8 = 0x1F;
pub const PARAM_ONEWIRE_RESET: u8 = 0x20;
pub const PARAM_ONEWIRE_SEARCH: u8 = 0x21;
pub const PARAM_TEMPERATURE: u8 = 0x22;
pub const PARAM_ONEWIRE_BIT: u8 = 0x23;

/// Top-level command of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read a parameter
    Read,
    /// Write a parameter
    Write,
}

impl Command {
    /// Decode a command byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_READ => Some(Command::Read),
            CMD_WRITE => Some(Command::Write),
            _ => None,
        }
    }

    /// Encode to a command byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Read => CMD_READ,
            Command::Write => CMD_WRITE,
        }
    }
}

/// Logical register selected by the parameter byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    Address,
    Name,
    Quiet,
    ProgrammingMode,
    Clock,
    Version,
    Pixels,
    Search,
    /// Stored byte register, index 0..=15
    StoredByte(u8),
    OneWireReset,
    OneWireSearch,
    Temperature,
    OneWireBit,
}

impl Parameter {
    /// Decode a parameter byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            PARAM_ADDRESS => Some(Parameter::Address),
            PARAM_NAME => Some(Parameter::Name),
            PARAM_QUIET => Some(Parameter::Quiet),
            PARAM_PROGRAMMING => Some(Parameter::ProgrammingMode),
            PARAM_CLOCK => Some(Parameter::Clock),
            PARAM_VERSION => Some(Parameter::Version),
            PARAM_PIXELS => Some(Parameter::Pixels),
            PARAM_SEARCH => Some(Parameter::Search),
            PARAM_STORED_FIRST..=PARAM_STORED_LAST => {
                Some(Parameter::StoredByte(byte - PARAM_STORED_FIRST))
            }
            PARAM_ONEWIRE_RESET => Some(Parameter::OneWireReset),
            PARAM_ONEWIRE_SEARCH => Some(Parameter::OneWireSearch),
            PARAM_TEMPERATURE => Some(Parameter::Temperature),
            PARAM_ONEWIRE_BIT => Some(Parameter::OneWireBit),
            _ => None,
        }
    }

    /// Encode to a parameter byte
    pub fn to_byte(self) -> u8 {
        match self {
            Parameter::Address => PARAM_ADDRESS,
            Parameter::Name => PARAM_NAME,
            Parameter::Quiet => PARAM_QUIET,
            Parameter::ProgrammingMode => PARAM_PROGRAMMING,
            Parameter::Clock => PARAM_CLOCK,
            Parameter::Version => PARAM_VERSION,
            Parameter::Pixels => PARAM_PIXELS,
            Parameter::Search => PARAM_SEARCH,
            Parameter::StoredByte(index) => PARAM_STORED_FIRST + (index & 0x0F),
            Parameter::OneWireReset => PARAM_ONEWIRE_RESET,
            Parameter::OneWireSearch => PARAM_ONEWIRE_SEARCH,
            Parameter::Temperature => PARAM_TEMPERATURE,
            Parameter::OneWireBit => PARAM_ONEWIRE_BIT,
        }
    }
}

/// Who a frame is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Destination {
    /// A single unit address
    Unicast(u8),
    /// Every unit on the bus
    Broadcast,
}

impl Destination {
    /// Decode an address byte
    pub fn from_byte(byte: u8) -> Self {
        if byte == BROADCAST_ADDRESS {
            Destination::Broadcast
        } else {
            Destination::Unicast(byte)
        }
    }

    /// Encode to an address byte
    pub fn to_byte(self) -> u8 {
        match self {
            Destination::Unicast(address) => address,
            Destination::Broadcast => BROADCAST_ADDRESS,
        }
    }

    /// Whether a unit at `address` must process the frame
    pub fn includes(self, address: u8) -> bool {
        match self {
            Destination::Unicast(to) => to == address,
            Destination::Broadcast => true,
        }
    }
}
