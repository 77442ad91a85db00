//! DS18B20 temperature sensor network
//!
//! Any number of DS18B20s can share one 1-Wire line. Each carries a 64-bit
//! ROM id, found with the ROM search below. Temperatures are raw
//! scratchpad readings in 1/16 °C.
//!
//! # ROM search
//!
//! Every search walks the id bits from least significant up. At each bit
//! all remaining devices send the bit and its complement; both low means
//! the devices disagree. The discrepancy mask remembers the positions
//! where the 1-branch was taken: the next search follows the mask up to
//! its highest set bit and takes the 0-branch there. When the mask comes
//! back empty the last device has been found.

use bull_core::traits::{DeviceId, OneWireError, OneWireNetwork};
use bull_hal::OneWireLine;

/// ROM and function commands
pub mod command {
    /// Enumerate device ids
    pub const SEARCH_ROM: u8 = 0xF0;
    /// Address one device by id
    pub const MATCH_ROM: u8 = 0x55;
    /// Address every device
    pub const SKIP_ROM: u8 = 0xCC;
    /// Start a temperature conversion
    pub const CONVERT_T: u8 = 0x44;
    /// Read the scratchpad
    pub const READ_SCRATCHPAD: u8 = 0xBE;
}

/// Read slots to wait for a conversion before reading anyway
///
/// A read slot takes about 70 µs, so this is well past the 750 ms a
/// 12-bit conversion needs.
pub const CONVERSION_POLL_LIMIT: u32 = 20_000;

/// DS18B20 sensors on one line
pub struct Ds18b20Network<L> {
    line: L,
}

impl<L: OneWireLine> Ds18b20Network<L> {
    pub fn new(line: L) -> Self {
        Self { line }
    }

    pub fn line(&mut self) -> &mut L {
        &mut self.line
    }

    pub fn release(self) -> L {
        self.line
    }

    /// Wait for every converting device to finish
    ///
    /// Devices hold read slots low until their conversion is done.
    fn wait_for_conversion(&mut self) -> bool {
        for _ in 0..CONVERSION_POLL_LIMIT {
            if self.line.read_bit() {
                return true;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("Conversion still busy after {} polls", CONVERSION_POLL_LIMIT);
        false
    }
}

impl<L: OneWireLine> OneWireNetwork for Ds18b20Network<L> {
    fn reset(&mut self) -> bool {
        self.line.reset()
    }

    fn write_bit(&mut self, bit: bool) {
        self.line.write_bit(bit);
    }

    fn read_bit(&mut self) -> bool {
        self.line.read_bit()
    }

    fn search_next(&mut self, mask: &mut u64) -> Result<DeviceId, OneWireError> {
        if !self.line.reset() {
            return Err(OneWireError::NoPresence);
        }
        self.line.write_byte(command::SEARCH_ROM);

        let mut id: DeviceId = 0;
        for position in 0..64 {
            let bit = 1u64 << position;
            let normal = self.line.read_bit();
            let complement = self.line.read_bit();

            let chosen = match (normal, complement) {
                (true, true) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ROM search lost all devices at bit {}", position);
                    return Err(OneWireError::SearchFailed);
                }
                (false, false) => {
                    let above = *mask >> position;
                    if *mask & bit != 0 {
                        if above == 1 {
                            // Highest mark: the 1-branch is done, take 0
                            *mask ^= bit;
                            false
                        } else {
                            true
                        }
                    } else if above == 0 {
                        // New discrepancy past the mask
                        *mask |= bit;
                        true
                    } else {
                        false
                    }
                }
                (normal, _) => normal,
            };

            if chosen {
                id |= bit;
            }
            self.line.write_bit(chosen);
        }

        Ok(id)
    }

    fn read_temperature(&mut self, device: Option<DeviceId>) -> i16 {
        self.line.reset();
        self.line.write_byte(command::SKIP_ROM);
        self.line.write_byte(command::CONVERT_T);
        self.wait_for_conversion();

        self.line.reset();
        match device {
            Some(id) => {
                self.line.write_byte(command::MATCH_ROM);
                for byte in id.to_le_bytes() {
                    self.line.write_byte(byte);
                }
            }
            None => self.line.write_byte(command::SKIP_ROM),
        }
        self.line.write_byte(command::READ_SCRATCHPAD);

        let low = self.line.read_byte();
        let high = self.line.read_byte();
        self.line.reset();

        i16::from_le_bytes([low, high])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Command,
        Search { position: u32, reads: u8 },
        MatchRom { bits: u32, id: u64 },
        Converting { polls: u32 },
        Scratchpad { bit: u32 },
        Idle,
    }

    struct Sensor {
        id: u64,
        raw: i16,
    }

    /// Bit-level model of DS18B20s on a wired-AND line
    struct SimLine {
        sensors: Vec<Sensor>,
        active: Vec<bool>,
        phase: Phase,
        byte: u8,
        bits: u8,
        conversion_polls: u32,
        commands: Vec<u8>,
    }

    impl SimLine {
        fn new(sensors: &[(u64, i16)]) -> Self {
            Self {
                sensors: sensors
                    .iter()
                    .map(|&(id, raw)| Sensor { id, raw })
                    .collect(),
                active: vec![true; sensors.len()],
                phase: Phase::Idle,
                byte: 0,
                bits: 0,
                conversion_polls: 3,
                commands: Vec::new(),
            }
        }

        /// Wired-AND of what every selected device drives
        fn wired_and(&self, bit: impl Fn(&Sensor) -> bool) -> bool {
            self.sensors
                .iter()
                .zip(&self.active)
                .filter(|(_, &active)| active)
                .all(|(sensor, _)| bit(sensor))
        }

        fn command(&mut self, byte: u8) {
            self.commands.push(byte);
            self.phase = match byte {
                command::SEARCH_ROM => Phase::Search {
                    position: 0,
                    reads: 0,
                },
                command::MATCH_ROM => Phase::MatchRom { bits: 0, id: 0 },
                command::SKIP_ROM => Phase::Command,
                command::CONVERT_T => Phase::Converting {
                    polls: self.conversion_polls,
                },
                command::READ_SCRATCHPAD => Phase::Scratchpad { bit: 0 },
                _ => Phase::Idle,
            };
        }
    }

    impl OneWireLine for SimLine {
        fn reset(&mut self) -> bool {
            self.active.iter_mut().for_each(|a| *a = true);
            self.phase = Phase::Command;
            self.byte = 0;
            self.bits = 0;
            !self.sensors.is_empty()
        }

        fn write_bit(&mut self, bit: bool) {
            match self.phase {
                Phase::Command => {
                    self.byte |= (bit as u8) << self.bits;
                    self.bits += 1;
                    if self.bits == 8 {
                        let byte = self.byte;
                        self.byte = 0;
                        self.bits = 0;
                        self.command(byte);
                    }
                }
                Phase::Search { position, .. } => {
                    for (sensor, active) in self.sensors.iter().zip(self.active.iter_mut()) {
                        if (sensor.id >> position) & 1 != bit as u64 {
                            *active = false;
                        }
                    }
                    self.phase = if position == 63 {
                        Phase::Idle
                    } else {
                        Phase::Search {
                            position: position + 1,
                            reads: 0,
                        }
                    };
                }
                Phase::MatchRom { bits, id } => {
                    let id = id | (bit as u64) << bits;
                    if bits == 63 {
                        for (sensor, active) in self.sensors.iter().zip(self.active.iter_mut()) {
                            *active = sensor.id == id;
                        }
                        self.phase = Phase::Command;
                    } else {
                        self.phase = Phase::MatchRom { bits: bits + 1, id };
                    }
                }
                _ => {}
            }
        }

        fn read_bit(&mut self) -> bool {
            match self.phase {
                Phase::Search { position, reads } => {
                    self.phase = Phase::Search {
                        position,
                        reads: reads + 1,
                    };
                    match reads {
                        0 => self.wired_and(|s| (s.id >> position) & 1 == 1),
                        _ => self.wired_and(|s| (s.id >> position) & 1 == 0),
                    }
                }
                Phase::Converting { polls } => {
                    if polls == 0 {
                        true
                    } else {
                        self.phase = Phase::Converting { polls: polls - 1 };
                        false
                    }
                }
                Phase::Scratchpad { bit } => {
                    self.phase = Phase::Scratchpad { bit: bit + 1 };
                    bit >= 16 || self.wired_and(|s| (s.raw as u16 >> bit) & 1 == 1)
                }
                _ => true,
            }
        }
    }

    const IDS: [u64; 3] = [
        0x2800_0001_0203_0428,
        0x7700_0001_0203_0428,
        0x2800_00FF_0203_0528,
    ];

    fn enumerate(network: &mut Ds18b20Network<SimLine>) -> Vec<u64> {
        let mut found = Vec::new();
        let mut mask = 0;
        loop {
            found.push(network.search_next(&mut mask).unwrap());
            if mask == 0 || found.len() > 8 {
                return found;
            }
        }
    }

    #[test]
    fn test_search_finds_every_device_once() {
        let sensors: Vec<(u64, i16)> = IDS.iter().map(|&id| (id, 0)).collect();
        let mut network = Ds18b20Network::new(SimLine::new(&sensors));

        let mut found = enumerate(&mut network);
        found.sort_unstable();
        let mut expected = IDS.to_vec();
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_search_single_device() {
        let mut network = Ds18b20Network::new(SimLine::new(&[(IDS[0], 0)]));
        let mut mask = 0;
        assert_eq!(network.search_next(&mut mask), Ok(IDS[0]));
        assert_eq!(mask, 0);
    }

    #[test]
    fn test_search_without_devices() {
        let mut network = Ds18b20Network::new(SimLine::new(&[]));
        let mut mask = 0;
        assert_eq!(
            network.search_next(&mut mask),
            Err(OneWireError::NoPresence)
        );
        assert_eq!(OneWireError::NoPresence.sentinel(), u64::MAX);
    }

    #[test]
    fn test_search_lost_devices() {
        // Presence pulse, then nobody drives the search bits
        struct Vanishing(SimLine);
        impl OneWireLine for Vanishing {
            fn reset(&mut self) -> bool {
                true
            }
            fn write_bit(&mut self, bit: bool) {
                self.0.write_bit(bit);
            }
            fn read_bit(&mut self) -> bool {
                self.0.read_bit()
            }
        }
        let mut network = Ds18b20Network::new(Vanishing(SimLine::new(&[])));
        let mut mask = 0;
        assert_eq!(
            network.search_next(&mut mask),
            Err(OneWireError::SearchFailed)
        );
    }

    #[test]
    fn test_temperature_of_matched_device() {
        let mut network =
            Ds18b20Network::new(SimLine::new(&[(IDS[0], 0x0191), (IDS[1], -0x0037)]));

        assert_eq!(network.read_temperature(Some(IDS[1])), -0x0037);
        assert_eq!(network.read_temperature(Some(IDS[0])), 0x0191);
        assert_eq!(
            network.line().commands[..4],
            [
                command::SKIP_ROM,
                command::CONVERT_T,
                command::MATCH_ROM,
                command::READ_SCRATCHPAD
            ]
        );
    }

    #[test]
    fn test_temperature_of_single_device_skips_rom() {
        let mut network = Ds18b20Network::new(SimLine::new(&[(IDS[2], 0x0550)]));
        assert_eq!(network.read_temperature(None), 0x0550);
        assert!(!network.line().commands.contains(&command::MATCH_ROM));
    }

    #[test]
    fn test_conversion_wait_is_bounded() {
        let mut line = SimLine::new(&[(IDS[0], 0x0191)]);
        line.conversion_polls = u32::MAX;
        let mut network = Ds18b20Network::new(line);
        // Gives up waiting and reads whatever the scratchpad holds
        assert_eq!(network.read_temperature(None), 0x0191);
    }
}
