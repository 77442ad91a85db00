//! Write requests

use bull_hal::storage::StorageRegion;
use bull_hal::ByteStore;
use bull_protocol::registry::CMD_WRITE;
use bull_protocol::{Frame, Parameter, ReplyError, BROADCAST_ADDRESS};

use super::{parameter, require_len, store_failed, Exchange, Outcome, Unit};
use crate::traits::{Board, OneWireNetwork, PixelChain};

/// Reply text for accepted pixel data
const PIXELS_OK: &str = "OK";

impl Unit {
    pub(super) fn handle_write<B: Board>(
        &mut self,
        exchange: &mut Exchange,
        param: u8,
        payload: &[u8],
        board: &mut B,
    ) -> Result<Outcome, ReplyError> {
        match parameter(param)? {
            Parameter::Address => self.write_address(exchange, payload, board),
            Parameter::Name => {
                let len = payload.len().min(StorageRegion::Name.len() as usize);
                if let Err(e) = board
                    .store()
                    .write_block(StorageRegion::Name.offset(), &payload[..len])
                {
                    return Ok(store_failed(e));
                }
                Ok(self.ack(param))
            }
            Parameter::Quiet => {
                if let &[target] = payload {
                    if target == self.address || target == BROADCAST_ADDRESS {
                        exchange.force_reply();
                        return Ok(self.ack(param));
                    }
                }
                Ok(Outcome::Quiet)
            }
            Parameter::ProgrammingMode => {
                board.enter_bootloader();
                Err(ReplyError::ProgrammingModeFailed)
            }
            Parameter::Clock => {
                let bytes: [u8; 4] = payload
                    .try_into()
                    .map_err(|_| ReplyError::InvalidLength)?;
                self.clock_s = u32::from_le_bytes(bytes);
                Ok(self.ack(param))
            }
            Parameter::Pixels => {
                if payload.is_empty() || payload.len() % 3 != 0 {
                    return Err(ReplyError::LengthNotMultipleOfThree);
                }
                let pixels = board.pixels();
                for rgb in payload.chunks_exact(3) {
                    pixels.write_color(rgb[0], rgb[1], rgb[2]);
                }
                Ok(Outcome::Reply(Frame::text(
                    self.address,
                    CMD_WRITE,
                    param,
                    PIXELS_OK,
                )))
            }
            Parameter::Search => {
                require_len(payload, 1)?;
                self.search.start_round(payload[0], &mut self.entropy);
                Ok(self.ack(param))
            }
            Parameter::StoredByte(index) => {
                require_len(payload, 1)?;
                let offset = StorageRegion::Registers
                    .at(index)
                    .ok_or(ReplyError::InvalidParameter)?;
                if let Err(e) = board.store().write_byte(offset, payload[0]) {
                    return Ok(store_failed(e));
                }
                Ok(self.ack(param))
            }
            Parameter::OneWireReset => {
                let present = board.onewire().reset();
                Ok(self.write_reply(param, &[present as u8]))
            }
            Parameter::OneWireSearch => {
                if matches!(payload, &[restart] if restart != 0) {
                    self.onewire.discrepancy = 0;
                }

                let id = match board.onewire().search_next(&mut self.onewire.discrepancy) {
                    Ok(id) => {
                        self.onewire.device = Some(id);
                        id
                    }
                    Err(e) => {
                        self.onewire.device = None;
                        self.onewire.discrepancy = 0;
                        e.sentinel()
                    }
                };

                let mut data = [0u8; 16];
                data[..8].copy_from_slice(&id.to_le_bytes());
                data[8..].copy_from_slice(&self.onewire.discrepancy.to_le_bytes());
                Ok(self.write_reply(param, &data))
            }
            Parameter::OneWireBit => {
                let line = board.onewire();
                for &bit in payload {
                    line.write_bit(bit != 0);
                }
                // Payloads never exceed 255 bytes
                Ok(self.write_reply(param, &[payload.len() as u8]))
            }
            Parameter::Version | Parameter::Temperature => Err(ReplyError::InvalidParameter),
        }
    }

    /// Write of the address register
    ///
    /// The two-byte form `[new, slot]` is meant for whichever unit
    /// announced `slot`; every other unit sharing the old address keeps
    /// quiet and keeps its address.
    fn write_address<B: Board>(
        &mut self,
        exchange: &mut Exchange,
        payload: &[u8],
        board: &mut B,
    ) -> Result<Outcome, ReplyError> {
        if let &[_, slot] = payload {
            if !self.search.is_us(slot) {
                return Ok(Outcome::Silent);
            }
            exchange.force_reply();
        } else {
            require_len(payload, 1)?;
        }

        let address = payload[0];
        if let Err(e) = board
            .store()
            .write_byte(StorageRegion::Address.offset(), address)
        {
            return Ok(store_failed(e));
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Address changed from {} to {}", self.address, address);
        self.address = address;

        Ok(self.ack(Parameter::Address.to_byte()))
    }

    fn ack(&self, param: u8) -> Outcome {
        Outcome::Reply(Frame::ack(self.address, param))
    }

    fn write_reply(&self, param: u8, data: &[u8]) -> Outcome {
        Outcome::Reply(Frame::write_reply(self.address, param, data))
    }
}
