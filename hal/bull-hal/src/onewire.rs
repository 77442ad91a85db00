//! 1-Wire line primitives
//!
//! Bit-level timing is the implementation's responsibility; each call
//! completes a full time slot before returning.

/// A single 1-Wire data line
pub trait OneWireLine {
    /// Issue a reset pulse
    ///
    /// Returns `true` if at least one device answered with a presence pulse.
    fn reset(&mut self) -> bool;

    /// Write one bit time slot
    fn write_bit(&mut self, bit: bool);

    /// Read one bit time slot
    fn read_bit(&mut self) -> bool;

    /// Write a byte, least significant bit first
    fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0);
        }
    }

    /// Read a byte, least significant bit first
    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }
}
