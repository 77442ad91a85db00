//! Bull Hardware Abstraction Layer
//!
//! Traits for the MCU-level collaborators a bus unit relies on. Chip
//! support crates implement them; `bull-core` and `bull-drivers` consume
//! them.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  bull-core (unit engine, link driver)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bull-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL     │       │ bull-drivers  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Half-duplex bus transport
//! - [`storage::ByteStore`] - Offset-addressed non-volatile bytes
//! - [`adc::NoiseSource`] - Analog noise for entropy seeding
//! - [`onewire::OneWireLine`] - 1-Wire line primitives

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod onewire;
pub mod storage;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::NoiseSource;
pub use onewire::OneWireLine;
pub use storage::{ByteStore, StorageError, StorageRegion, ERASED};
pub use uart::{UartRx, UartTx};
