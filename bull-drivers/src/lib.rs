//! Device drivers
//!
//! Concrete implementations of the traits defined in bull-hal and
//! bull-core:
//!
//! - 1-Wire line bit-banged on an open-drain GPIO
//! - DS18B20 temperature sensor network (ROM search, conversions)
//! - RAM-backed byte store

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod onewire;
pub mod storage;
