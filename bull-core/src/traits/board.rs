//! Board services used by the unit engine

use bull_hal::ByteStore;

use super::onewire::OneWireNetwork;
use super::pixel::PixelChain;

/// Link state shown to people near the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Ignoring bus traffic until the line goes quiet
    Deaf,
    /// Back to processing frames
    Listening,
}

/// Everything a unit can reach besides the bus itself
pub trait Board {
    /// Non-volatile byte store
    type Store: ByteStore;
    /// 1-Wire sensor network
    type OneWire: OneWireNetwork;
    /// Addressable pixel chain
    type Pixels: PixelChain;

    fn store(&mut self) -> &mut Self::Store;

    fn onewire(&mut self) -> &mut Self::OneWire;

    fn pixels(&mut self) -> &mut Self::Pixels;

    /// Low byte of a free-running counter independent of the bus clock
    fn counter(&mut self) -> u8;

    /// Hand control to the bootloader
    ///
    /// Only returns if the bootloader could not be started.
    fn enter_bootloader(&mut self);

    /// Show a link status (blink, Morse, ...)
    fn announce(&mut self, _status: Status) {}
}
