//! Bull Bus Protocol
//!
//! Wire format shared by the master and every unit on a multi-drop,
//! half-duplex serial line.
//!
//! # Frame Format
//!
//! ```text
//! ┌─────────┬─────────┬───────────┬────────┬─────────────┬──────────┐
//! │ ADDRESS │ COMMAND │ PARAMETER │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 1B      │ 1B      │ 1B        │ 1B     │ 0–255B      │ 1B       │
//! └─────────┴─────────┴───────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is the wrapping 8-bit sum of every preceding byte.
//! Address `0xFF` is broadcast. Command `0x01` reads a parameter,
//! `0x81` writes it and `0xFF` marks an error reply whose payload is an
//! ASCII reason.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod frame;
pub mod registry;
pub mod reply;

pub use accumulator::FrameAccumulator;
pub use frame::{
    checksum, checksum_ok, frame_len, is_frame_complete, Frame, FrameError, FrameView,
    BROADCAST_ADDRESS, FRAME_OVERHEAD, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use registry::{Command, Destination, Parameter};
pub use reply::ReplyError;
