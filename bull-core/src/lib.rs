//! Board-agnostic logic for a bull bus unit
//!
//! This crate contains everything a unit does that does not depend on a
//! specific chip:
//!
//! - Entropy pool seeded from analog noise and stored bytes
//! - Address arbitration (randomized slot election)
//! - Unit engine: frame validation, addressing, dispatch, reply suppression
//! - Link driver tying the engine to a UART
//! - Device-level traits (1-Wire network, pixel chain, board services)
//! - Unit configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod entropy;
pub mod link;
pub mod search;
pub mod traits;
pub mod unit;

#[cfg(test)]
pub(crate) mod mock;

pub use config::UnitConfig;
pub use entropy::EntropyPool;
pub use link::{Link, LinkError};
pub use search::{Arbitration, SearchState, Slot, SlotDraw};
pub use unit::{Action, Unit};
