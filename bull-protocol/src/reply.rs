//! Reply frames sent by units
//!
//! A successful reply echoes the request's command and parameter with the
//! unit's own address. An error reply uses command 0xFF, echoes the failing
//! parameter (0x00 for frame-level errors) and carries an ASCII reason.

use crate::frame::Frame;
use crate::registry::{CMD_ERROR, CMD_READ, CMD_WRITE, PARAM_NONE};

/// Reasons a request is answered with an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Checksum mismatch on a frame addressed to us
    BadChecksum,
    /// Command byte is neither read nor write
    UnhandledCommand,
    /// Parameter byte not mapped for the command
    InvalidParameter,
    /// Payload length differs from what the handler requires
    InvalidLength,
    /// Pixel payload is empty or not whole RGB triples
    LengthNotMultipleOfThree,
    /// The bootloader could not be entered
    ProgrammingModeFailed,
}

impl ReplyError {
    /// ASCII reason carried in the payload
    pub fn reason(self) -> &'static str {
        match self {
            ReplyError::BadChecksum => "Bad checksum",
            ReplyError::UnhandledCommand => "Unhandled command",
            ReplyError::InvalidParameter => "Invalid parameter",
            ReplyError::InvalidLength => "Invalid length",
            ReplyError::LengthNotMultipleOfThree => "Length must be a multiple of three",
            ReplyError::ProgrammingModeFailed => "Failed programming mode",
        }
    }

    /// Whether the error concerns the frame rather than a parameter
    pub fn is_frame_level(self) -> bool {
        matches!(self, ReplyError::BadChecksum | ReplyError::UnhandledCommand)
    }
}

impl Frame {
    /// Error reply from `address` for `parameter`
    ///
    /// Frame-level errors always report parameter 0x00.
    pub fn error(address: u8, parameter: u8, error: ReplyError) -> Self {
        let parameter = if error.is_frame_level() {
            PARAM_NONE
        } else {
            parameter
        };
        Self::text(address, CMD_ERROR, parameter, error.reason())
    }

    /// Reply carrying an ASCII string
    ///
    /// Strings longer than a payload are cut at the payload limit.
    pub fn text(address: u8, command: u8, parameter: u8, text: &str) -> Self {
        let mut frame = Self::empty(address, command, parameter);
        let bytes = text.as_bytes();
        let len = bytes.len().min(frame.payload.capacity());
        // Cannot fail, length is clamped to capacity
        let _ = frame.payload.extend_from_slice(&bytes[..len]);
        frame
    }

    /// Successful read reply
    pub fn read_reply(address: u8, parameter: u8, data: &[u8]) -> Self {
        let mut frame = Self::empty(address, CMD_READ, parameter);
        let len = data.len().min(frame.payload.capacity());
        let _ = frame.payload.extend_from_slice(&data[..len]);
        frame
    }

    /// Successful write reply with a payload
    pub fn write_reply(address: u8, parameter: u8, data: &[u8]) -> Self {
        let mut frame = Self::empty(address, CMD_WRITE, parameter);
        let len = data.len().min(frame.payload.capacity());
        let _ = frame.payload.extend_from_slice(&data[..len]);
        frame
    }

    /// Empty write acknowledgement
    pub fn ack(address: u8, parameter: u8) -> Self {
        Self::empty(address, CMD_WRITE, parameter)
    }

    /// Whether this is an error reply
    pub fn is_error(&self) -> bool {
        self.command == CMD_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::checksum_ok;

    #[test]
    fn test_error_reply_layout() {
        let frame = Frame::error(0x05, 0x05, ReplyError::InvalidLength);
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded[0], 0x05);
        assert_eq!(encoded[1], 0xFF);
        assert_eq!(encoded[2], 0x05);
        assert_eq!(encoded[3] as usize, "Invalid length".len());
        assert_eq!(&encoded[4..encoded.len() - 1], b"Invalid length");
        assert!(checksum_ok(&encoded));
    }

    #[test]
    fn test_frame_level_errors_report_no_parameter() {
        let frame = Frame::error(0x05, 0x08, ReplyError::BadChecksum);
        assert_eq!(frame.parameter, 0x00);

        let frame = Frame::error(0x05, 0x08, ReplyError::UnhandledCommand);
        assert_eq!(frame.parameter, 0x00);
        assert!(frame.is_error());
    }

    #[test]
    fn test_ack() {
        let frame = Frame::ack(0x07, 0x01);
        assert_eq!(frame.command, 0x81);
        assert!(frame.payload.is_empty());
        assert!(!frame.is_error());
    }
}
