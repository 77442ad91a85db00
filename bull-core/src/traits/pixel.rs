//! Addressable pixel chain trait

/// A chain of serially addressed RGB pixels
///
/// Each call sets the next pixel in line. A pause in writes latches the
/// chain and the next write starts again at the first pixel.
pub trait PixelChain {
    /// Send one RGB color to the next pixel
    fn write_color(&mut self, red: u8, green: u8, blue: u8);
}
