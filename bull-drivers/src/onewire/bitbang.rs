//! Bit-banged 1-Wire line
//!
//! Drives a single open-drain GPIO with an external pull-up: setting the
//! pin low pulls the line down, setting it high releases it.
//!
//! Slot timings (µs):
//!
//! | Slot     | Low | Then                | Rest |
//! |----------|-----|---------------------|------|
//! | Reset    | 480 | sample after 70     | 410  |
//! | Write 1  | 6   | release             | 64   |
//! | Write 0  | 60  | release             | 10   |
//! | Read     | 5   | release, sample at 9 | 55  |
//!
//! Write and read slots are sensitive to interruption. Run them inside a
//! critical section if interrupts can fire for longer than a few µs.

use core::convert::Infallible;

use bull_hal::OneWireLine;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

const RESET_LOW_US: u32 = 480;
const PRESENCE_WAIT_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;

const WRITE_LOW_US: u32 = 6;
const WRITE_SLOT_US: u32 = 54;
const WRITE_RECOVERY_US: u32 = 10;

const READ_LOW_US: u32 = 5;
const READ_SAMPLE_US: u32 = 9;
const READ_RECOVERY_US: u32 = 55;

/// 1-Wire line on an open-drain pin
pub struct BitBangOneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> BitBangOneWire<P, D>
where
    P: InputPin + OutputPin + ErrorType<Error = Infallible>,
    D: DelayNs,
{
    /// Take over the pin and release the line
    pub fn new(mut pin: P, delay: D) -> Self {
        infallible(pin.set_high());
        Self { pin, delay }
    }

    /// Give back the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn pull_low(&mut self) {
        infallible(self.pin.set_low());
    }

    fn let_go(&mut self) {
        infallible(self.pin.set_high());
    }

    fn line_high(&mut self) -> bool {
        infallible(self.pin.is_high())
    }
}

impl<P, D> OneWireLine for BitBangOneWire<P, D>
where
    P: InputPin + OutputPin + ErrorType<Error = Infallible>,
    D: DelayNs,
{
    fn reset(&mut self) -> bool {
        self.pull_low();
        self.delay.delay_us(RESET_LOW_US);
        self.let_go();
        self.delay.delay_us(PRESENCE_WAIT_US);

        // Devices answer by holding the line low
        let present = !self.line_high();
        self.delay.delay_us(RESET_RECOVERY_US);
        present
    }

    fn write_bit(&mut self, bit: bool) {
        self.pull_low();
        self.delay.delay_us(WRITE_LOW_US);
        if bit {
            self.let_go();
        }
        self.delay.delay_us(WRITE_SLOT_US);
        self.let_go();
        self.delay.delay_us(WRITE_RECOVERY_US);
    }

    fn read_bit(&mut self) -> bool {
        self.pull_low();
        self.delay.delay_us(READ_LOW_US);
        self.let_go();
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.line_high();
        self.delay.delay_us(READ_RECOVERY_US);
        bit
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
