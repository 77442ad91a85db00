//! Read requests

use bull_hal::storage::StorageRegion;
use bull_hal::ByteStore;
use bull_protocol::{Frame, Parameter, ReplyError};

use super::{parameter, store_failed, Exchange, Outcome, Unit};
use crate::traits::{Board, OneWireNetwork};

impl Unit {
    pub(super) fn handle_read<B: Board>(
        &mut self,
        exchange: &mut Exchange,
        param: u8,
        payload: &[u8],
        board: &mut B,
    ) -> Result<Outcome, ReplyError> {
        let address = self.address;
        let reply = |data: &[u8]| -> Result<Outcome, ReplyError> {
            Ok(Outcome::Reply(Frame::read_reply(address, param, data)))
        };

        match parameter(param)? {
            Parameter::Address => reply(&[self.address]),
            Parameter::Name => {
                let mut name = [0u8; StorageRegion::Name.len() as usize];
                match board
                    .store()
                    .read_block(StorageRegion::Name.offset(), &mut name)
                {
                    Ok(()) => reply(&name),
                    Err(e) => Ok(store_failed(e)),
                }
            }
            Parameter::Clock => reply(&self.clock_s.to_le_bytes()),
            Parameter::Version => reply(self.config.version.as_bytes()),
            Parameter::Search => Ok(self.read_search(exchange, payload)),
            Parameter::StoredByte(index) => {
                let offset = StorageRegion::Registers
                    .at(index)
                    .ok_or(ReplyError::InvalidParameter)?;
                match board.store().read_byte(offset) {
                    Ok(value) => reply(&[value]),
                    Err(e) => Ok(store_failed(e)),
                }
            }
            Parameter::OneWireSearch => {
                let device = self.onewire.device.unwrap_or(0);
                reply(&device.to_le_bytes())
            }
            Parameter::Temperature => {
                if let Ok(id) = <[u8; 8]>::try_from(payload) {
                    self.onewire.device = Some(u64::from_le_bytes(id));
                }
                let raw = board.onewire().read_temperature(self.onewire.device);

                let mut data = [0u8; 10];
                data[..2].copy_from_slice(&raw.to_le_bytes());
                data[2..].copy_from_slice(&self.onewire.device.unwrap_or(0).to_le_bytes());
                reply(&data)
            }
            Parameter::OneWireBit => {
                let bit = board.onewire().read_bit();
                reply(&[bit as u8])
            }
            Parameter::Quiet
            | Parameter::ProgrammingMode
            | Parameter::Pixels
            | Parameter::OneWireReset => Err(ReplyError::InvalidParameter),
        }
    }

    /// Read of the search register
    ///
    /// As a broadcast it is the master polling a slot. Sent to our own
    /// address it can only be a peer sharing that address answering a
    /// poll, so its payload is a slot to stay away from.
    fn read_search(&mut self, exchange: &mut Exchange, payload: &[u8]) -> Outcome {
        let &[slot] = payload else {
            return Outcome::Silent;
        };

        if !exchange.suppressed {
            #[cfg(feature = "defmt")]
            defmt::trace!("Peer at our address announced slot {}", slot);
            self.search.observe(slot);
            return Outcome::Silent;
        }

        match self.search.poll(slot, &mut self.entropy) {
            Some(next) => {
                exchange.force_reply();
                Outcome::Reply(Frame::read_reply(
                    self.address,
                    Parameter::Search.to_byte(),
                    &[next.to_wire()],
                ))
            }
            None => Outcome::Silent,
        }
    }
}
