//! Link driver
//!
//! Moves bytes between the UART and the unit engine. Bytes are read with a
//! bounded wait; a gap longer than the frame gap drops whatever partial
//! frame was buffered, which is how the unit finds frame boundaries again
//! after noise or after joining mid-frame.

use core::convert::Infallible;

use bull_hal::{UartRx, UartTx};
use bull_protocol::{Frame, FrameAccumulator, FrameError, MAX_FRAME_SIZE};

use crate::config::UnitConfig;
use crate::traits::{Board, Status};
use crate::unit::{Action, Unit};

/// Errors from the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The UART failed
    Transport(E),
    /// A reply could not be encoded
    Encode(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Encode(e)
    }
}

/// A unit's connection to the bus
pub struct Link<U> {
    uart: U,
    accumulator: FrameAccumulator,
    frame_gap_ms: u32,
    quiet_period_ms: u32,
}

impl<U, E> Link<U>
where
    U: UartRx<Error = E> + UartTx<Error = E>,
{
    pub fn new(uart: U, config: &UnitConfig) -> Self {
        Self {
            uart,
            accumulator: FrameAccumulator::new(),
            frame_gap_ms: config.frame_gap_ms,
            quiet_period_ms: config.quiet_period_ms,
        }
    }

    pub fn uart(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn release(self) -> U {
        self.uart
    }

    /// Bytes of a frame not yet complete
    pub fn pending(&self) -> usize {
        self.accumulator.len()
    }

    /// Serve the bus forever
    pub fn run<B: Board>(
        &mut self,
        unit: &mut Unit,
        board: &mut B,
        idle: &mut dyn FnMut(),
    ) -> Result<Infallible, LinkError<E>> {
        loop {
            self.poll(unit, board, idle)?;
        }
    }

    /// Wait for one byte and act on the frame it completes, if any
    pub fn poll<B: Board>(
        &mut self,
        unit: &mut Unit,
        board: &mut B,
        idle: &mut dyn FnMut(),
    ) -> Result<(), LinkError<E>> {
        let byte = self
            .uart
            .read_byte_timeout(self.frame_gap_ms, idle)
            .map_err(LinkError::Transport)?;

        let Some(byte) = byte else {
            if !self.accumulator.is_empty() {
                #[cfg(feature = "defmt")]
                defmt::debug!("Dropping {} bytes of a partial frame", self.accumulator.len());
                self.accumulator.reset();
            }
            return Ok(());
        };

        let Some(frame) = self.accumulator.feed(byte) else {
            return Ok(());
        };

        match unit.handle_frame(&frame, board) {
            Action::Silent => Ok(()),
            Action::Reply(reply) => self.send(&reply),
            Action::GoQuiet => self.stay_quiet(board, idle),
        }
    }

    /// Write a frame and release the line
    pub fn send(&mut self, frame: &Frame) -> Result<(), LinkError<E>> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer)?;
        self.uart
            .write_blocking(&buffer[..len])
            .map_err(LinkError::Transport)?;
        self.uart.flush().map_err(LinkError::Transport)
    }

    /// Swallow traffic until the line has been silent for the quiet period
    fn stay_quiet<B: Board>(
        &mut self,
        board: &mut B,
        idle: &mut dyn FnMut(),
    ) -> Result<(), LinkError<E>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Deaf until {} ms of silence", self.quiet_period_ms);
        board.announce(Status::Deaf);
        self.accumulator.reset();

        while self
            .uart
            .read_byte_timeout(self.quiet_period_ms, idle)
            .map_err(LinkError::Transport)?
            .is_some()
        {}

        #[cfg(feature = "defmt")]
        defmt::info!("Listening");
        board.announce(Status::Listening);
        Ok(())
    }
}
