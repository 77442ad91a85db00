//! Unit engine
//!
//! Takes one complete frame at a time and decides what the unit does with
//! it:
//!
//! - Frames for another address are dropped, except search replies from
//!   peers, which feed the collision tracker.
//! - Frames for us with a bad checksum get a "Bad checksum" error reply;
//!   broadcast frames with a bad checksum are dropped.
//! - Everything else is dispatched on command and parameter. Broadcast
//!   frames are acted on but not answered, unless the handler decides the
//!   frame was meant for this unit after all.
//!
//! After every frame a byte of an independent counter goes into the
//! entropy pool.

mod read;
mod write;

use bull_hal::storage::{StorageRegion, ERASED};
use bull_hal::{ByteStore, NoiseSource, StorageError};
use bull_protocol::{Command, Destination, Frame, FrameView, Parameter, ReplyError};

use crate::config::UnitConfig;
use crate::entropy::EntropyPool;
use crate::search::Arbitration;
use crate::traits::{Board, DeviceId};

/// What the link must do after a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to send
    Silent,
    /// Send this frame
    Reply(Frame),
    /// Ignore all traffic until the line has been quiet for a while
    GoQuiet,
}

/// Handler result before reply suppression is applied
#[derive(Debug)]
enum Outcome {
    Reply(Frame),
    Silent,
    Quiet,
}

/// Per-frame reply policy
///
/// Broadcast frames start suppressed. Handlers that find a broadcast was
/// meant for this unit lift it with [`Exchange::force_reply`].
#[derive(Debug, Clone, Copy)]
struct Exchange {
    suppressed: bool,
}

impl Exchange {
    fn new(destination: Destination) -> Self {
        Self {
            suppressed: destination == Destination::Broadcast,
        }
    }

    fn force_reply(&mut self) {
        self.suppressed = false;
    }

    fn finish(self, address: u8, parameter: u8, result: Result<Outcome, ReplyError>) -> Action {
        match result {
            Ok(Outcome::Quiet) => Action::GoQuiet,
            Ok(Outcome::Silent) => Action::Silent,
            _ if self.suppressed => Action::Silent,
            Ok(Outcome::Reply(frame)) => Action::Reply(frame),
            Err(error) => Action::Reply(Frame::error(address, parameter, error)),
        }
    }
}

/// Where the last 1-Wire ROM search left off
#[derive(Debug, Clone, Copy, Default)]
struct OneWireCursor {
    /// Last device found or addressed
    device: Option<DeviceId>,
    /// Search position, 0 to start over
    discrepancy: u64,
}

/// A bus unit
#[derive(Debug)]
pub struct Unit {
    config: UnitConfig,
    address: u8,
    /// Seconds as set by the master
    clock_s: u32,
    search: Arbitration,
    entropy: EntropyPool,
    onewire: OneWireCursor,
}

impl Unit {
    /// Create a unit with a known address and pool
    pub fn new(config: UnitConfig, address: u8, entropy: EntropyPool) -> Self {
        Self {
            config,
            address,
            clock_s: 0,
            search: Arbitration::new(),
            entropy,
            onewire: OneWireCursor::default(),
        }
    }

    /// Start a unit from its stored state
    ///
    /// Loads the address (an erased store means address 0) and seeds the
    /// entropy pool. An invalid configuration is replaced by the defaults.
    pub fn boot<B, N>(config: UnitConfig, board: &mut B, noise: &mut N) -> Self
    where
        B: Board,
        N: NoiseSource + ?Sized,
    {
        let config = match config.validate() {
            Ok(()) => config,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Invalid config ({:?}), using defaults", _e);
                UnitConfig::default()
            }
        };

        let address = match board.store().read_byte(StorageRegion::Address.offset()) {
            Ok(ERASED) => 0,
            Ok(address) => address,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Address read failed: {:?}", _e);
                0
            }
        };

        let entropy = EntropyPool::seeded(noise, board.store(), &config);

        #[cfg(feature = "defmt")]
        defmt::info!("Unit up at address {}", address);

        Self::new(config, address, entropy)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn clock(&self) -> u32 {
        self.clock_s
    }

    /// Advance the clock, wrapping at `u32::MAX`
    pub fn advance_clock(&mut self, seconds: u32) {
        self.clock_s = self.clock_s.wrapping_add(seconds);
    }

    pub fn search(&self) -> &Arbitration {
        &self.search
    }

    pub fn entropy_mut(&mut self) -> &mut EntropyPool {
        &mut self.entropy
    }

    /// Handle one complete frame
    ///
    /// Bytes past the frame's declared length are ignored; buffers too
    /// short to hold a frame are dropped silently.
    pub fn handle_frame<B: Board>(&mut self, bytes: &[u8], board: &mut B) -> Action {
        let action = match FrameView::parse(bytes) {
            Ok(frame) => self.process(&frame, board),
            Err(_) => Action::Silent,
        };

        self.entropy.feed(&[board.counter()]);
        action
    }

    fn process<B: Board>(&mut self, frame: &FrameView<'_>, board: &mut B) -> Action {
        let destination = frame.destination();

        if !frame.checksum_ok() {
            if destination == Destination::Unicast(self.address) {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Bad checksum on frame for us (param {=u8:#x})",
                    frame.parameter()
                );
                return Action::Reply(Frame::error(
                    self.address,
                    frame.parameter(),
                    ReplyError::BadChecksum,
                ));
            }
            return Action::Silent;
        }

        if !destination.includes(self.address) {
            if frame.is_search_reply() {
                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "Unit {} announced slot {}",
                    frame.address(),
                    frame.payload()[0]
                );
                self.search.observe(frame.payload()[0]);
            }
            return Action::Silent;
        }

        let mut exchange = Exchange::new(destination);
        let parameter = frame.parameter();
        let payload = frame.payload();
        let result = match Command::from_byte(frame.command()) {
            Some(Command::Read) => self.handle_read(&mut exchange, parameter, payload, board),
            Some(Command::Write) => self.handle_write(&mut exchange, parameter, payload, board),
            None => Err(ReplyError::UnhandledCommand),
        };

        exchange.finish(self.address, parameter, result)
    }
}

/// Length gate for handlers that need an exact payload size
fn require_len(payload: &[u8], expected: usize) -> Result<(), ReplyError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(ReplyError::InvalidLength)
    }
}

/// Resolve a parameter byte, or fail with "Invalid parameter"
fn parameter(byte: u8) -> Result<Parameter, ReplyError> {
    Parameter::from_byte(byte).ok_or(ReplyError::InvalidParameter)
}

/// A store operation failed: drop the frame without a reply
fn store_failed(_error: StorageError) -> Outcome {
    #[cfg(feature = "defmt")]
    defmt::error!("Store access failed: {:?}", _error);
    Outcome::Silent
}
