//! Configuration types
//!
//! Unit tunables, persisted as postcard binary data.

pub mod types;

pub use types::*;
