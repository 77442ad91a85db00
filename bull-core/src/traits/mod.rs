//! Device abstraction traits
//!
//! These traits define the interface between the unit engine and the
//! devices hanging off a unit. Bit-level timing lives behind them.

pub mod board;
pub mod onewire;
pub mod pixel;

pub use board::{Board, Status};
pub use onewire::{DeviceId, OneWireError, OneWireNetwork};
pub use pixel::PixelChain;
