//! UART serial communication abstractions
//!
//! The bus is a shared half-duplex line. Direction switching of the
//! RS485 transceiver is the implementation's business: `write_blocking`
//! drives the line and `flush` returns it to receive once the last byte
//! has left the shift register.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been queued or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data and release the line
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Bytes arrive from an interrupt into a bounded ring buffer; the
/// receiver only ever hands out bytes that are already buffered.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take the next buffered byte, if any, without waiting
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Number of bytes waiting in the receive buffer
    fn available(&self) -> usize;

    /// Wait up to `timeout_ms` for the next byte
    ///
    /// `idle` is called repeatedly while nothing is buffered so the caller
    /// can run housekeeping. Returns `Ok(None)` on timeout.
    fn read_byte_timeout(
        &mut self,
        timeout_ms: u32,
        idle: &mut dyn FnMut(),
    ) -> Result<Option<u8>, Self::Error>;
}

/// Combined UART interface
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}
