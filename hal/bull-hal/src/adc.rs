//! Analog noise source
//!
//! The least significant bits of an ADC conversion on a floating or
//! pulled-up pin carry thermal noise. Only those bits matter, but the
//! whole sample is handed over.

/// Source of raw analog samples
pub trait NoiseSource {
    /// Perform one (busy-wait) conversion and return the raw sample
    fn sample(&mut self) -> u16;
}
