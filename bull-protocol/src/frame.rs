//! Frame encoding and decoding for the bull bus.
//!
//! Frame format:
//! - ADDRESS (1 byte): destination on requests, sender on replies; 0xFF = broadcast
//! - COMMAND (1 byte): 0x01 read, 0x81 write, 0xFF error reply
//! - PARAMETER (1 byte): logical register
//! - LENGTH (1 byte): payload length (0-255)
//! - PAYLOAD (LENGTH bytes)
//! - CHECKSUM (1 byte): wrapping sum of all preceding bytes

use heapless::Vec;

use crate::registry::{Destination, CMD_READ, PARAM_SEARCH};

/// Destination byte addressing every unit
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Header bytes before the payload (ADDRESS + COMMAND + PARAMETER + LENGTH)
pub const HEADER_SIZE: usize = 4;

/// Bytes a frame carries besides its payload (header + CHECKSUM)
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + 1;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

const LENGTH_INDEX: usize = 3;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Frame is incomplete (need more bytes)
    Incomplete,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Wrapping 8-bit sum of `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Check the trailing checksum byte of a frame
///
/// The last byte must equal the sum of all bytes before it. An empty
/// slice never passes.
pub fn checksum_ok(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&expected, body)) => checksum(body) == expected,
        None => false,
    }
}

/// Total size of the frame starting at `buffer[0]`, once the header is in
///
/// Returns `None` while fewer than `FRAME_OVERHEAD` bytes are buffered.
pub fn frame_len(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < FRAME_OVERHEAD {
        return None;
    }
    Some(buffer[LENGTH_INDEX] as usize + FRAME_OVERHEAD)
}

/// Whether `buffer` holds at least one complete frame
pub fn is_frame_complete(buffer: &[u8]) -> bool {
    matches!(frame_len(buffer), Some(len) if buffer.len() >= len)
}

/// Borrowed view of one complete frame
///
/// The view covers exactly `LENGTH + 5` bytes; anything trailing in the
/// source buffer belongs to the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameView<'a> {
    bytes: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// View the frame at the start of `buffer`
    pub fn parse(buffer: &'a [u8]) -> Result<Self, FrameError> {
        match frame_len(buffer) {
            Some(len) if buffer.len() >= len => Ok(Self {
                bytes: &buffer[..len],
            }),
            _ => Err(FrameError::Incomplete),
        }
    }

    /// Raw frame bytes including the checksum
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Address byte
    pub fn address(&self) -> u8 {
        self.bytes[0]
    }

    /// Address byte interpreted as a destination
    pub fn destination(&self) -> Destination {
        Destination::from_byte(self.address())
    }

    /// Command byte
    pub fn command(&self) -> u8 {
        self.bytes[1]
    }

    /// Parameter byte
    pub fn parameter(&self) -> u8 {
        self.bytes[2]
    }

    /// Declared payload length
    pub fn length(&self) -> u8 {
        self.bytes[LENGTH_INDEX]
    }

    /// Payload bytes
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[HEADER_SIZE..self.bytes.len() - 1]
    }

    /// Checksum byte as received
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Whether the checksum matches the frame contents
    pub fn checksum_ok(&self) -> bool {
        checksum_ok(self.bytes)
    }

    /// Whether this has the exact shape of a unit answering a slot poll
    ///
    /// Read command, search parameter and a single payload byte carrying
    /// the unit's next slot. Nothing looser qualifies.
    pub fn is_search_reply(&self) -> bool {
        self.command() == CMD_READ && self.parameter() == PARAM_SEARCH && self.length() == 1
    }
}

/// An owned frame to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Address byte (sender on replies)
    pub address: u8,
    /// Command byte
    pub command: u8,
    /// Parameter byte
    pub parameter: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame
    pub fn new(address: u8, command: u8, parameter: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            address,
            command,
            parameter,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(address: u8, command: u8, parameter: u8) -> Self {
        Self {
            address,
            command,
            parameter,
            payload: Vec::new(),
        }
    }

    /// Size of the encoded frame
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.address;
        buffer[1] = self.command;
        buffer[2] = self.parameter;
        buffer[LENGTH_INDEX] = self.payload.len() as u8;
        buffer[HEADER_SIZE..HEADER_SIZE + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = checksum(&buffer[..frame_len - 1]);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}
