//! Byte store drivers

pub mod ram;

pub use ram::RamStore;
