//! 1-Wire drivers

pub mod bitbang;
pub mod ds18b20;

pub use bitbang::BitBangOneWire;
pub use ds18b20::Ds18b20Network;
