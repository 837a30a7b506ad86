// Copyright (c) 2017-2019 Rene van der Meer
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
// THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::Bus;

const DEFAULT_CLOCK_SPEED: u32 = 100_000;
// Fast-mode, the fastest the BQ32000 supports
const MAX_CLOCK_SPEED: u32 = 400_000;

/// Bit-banged I2C master on two GPIO pins.
///
/// `SoftI2c` implements [`Bus`] by toggling SDA and SCL directly. Both pins
/// should be configured as open-drain outputs with pull-ups, so setting a pin
/// high releases the line. SDA is also read back, to sample ACK bits and
/// incoming data. Clock stretching isn't supported.
///
/// Timing is derived from the clock speed, which defaults to 100 kHz
/// (Standard-mode). Every clock phase waits half a period using `delay`.
///
/// [`Bus`]: trait.Bus.html
#[derive(Debug)]
pub struct SoftI2c<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    clock_speed: u32,
    half_period_ns: u32,
}

impl<SDA, SCL, D, E> SoftI2c<SDA, SCL, D>
where
    SDA: InputPin + OutputPin + ErrorType<Error = E>,
    SCL: OutputPin + ErrorType<Error = E>,
    D: DelayNs,
{
    /// Constructs a new `SoftI2c`, and releases both lines so the bus is idle.
    pub fn new(mut sda: SDA, mut scl: SCL, delay: D) -> Result<SoftI2c<SDA, SCL, D>, E> {
        sda.set_high()?;
        scl.set_high()?;

        Ok(SoftI2c {
            sda,
            scl,
            delay,
            clock_speed: DEFAULT_CLOCK_SPEED,
            half_period_ns: half_period_ns(DEFAULT_CLOCK_SPEED),
        })
    }

    /// Returns the clock frequency in hertz (Hz).
    pub fn clock_speed(&self) -> u32 {
        self.clock_speed
    }

    /// Sets the clock frequency in hertz (Hz).
    ///
    /// `clock_speed` is limited to 400 kHz. Actual bus speed will be lower,
    /// since pin access adds to every half period.
    pub fn set_clock_speed(&mut self, clock_speed: u32) {
        self.clock_speed = clock_speed.clamp(1, MAX_CLOCK_SPEED);
        self.half_period_ns = half_period_ns(self.clock_speed);
    }

    /// Consumes the `SoftI2c`, returning the pins and delay.
    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    fn wait(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    // Shifts out whatever is on SDA with one full SCL cycle
    fn clock_pulse(&mut self) -> Result<(), E> {
        self.wait();
        self.scl.set_high()?;
        self.wait();
        self.scl.set_low()
    }
}

fn half_period_ns(clock_speed: u32) -> u32 {
    500_000_000 / clock_speed
}

impl<SDA, SCL, D, E> Bus for SoftI2c<SDA, SCL, D>
where
    SDA: InputPin + OutputPin + ErrorType<Error = E>,
    SCL: OutputPin + ErrorType<Error = E>,
    D: DelayNs,
{
    type Error = E;

    fn start(&mut self) -> Result<(), E> {
        // SCL is already low for a repeated START, so SDA can be released first
        self.sda.set_high()?;
        self.scl.set_high()?;
        self.wait();
        self.sda.set_low()?;
        self.wait();
        self.scl.set_low()
    }

    fn write(&mut self, byte: u8) -> Result<(), E> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.sda.set_high()?;
            } else {
                self.sda.set_low()?;
            }

            self.clock_pulse()?;
        }

        Ok(())
    }

    fn await_ack(&mut self) -> Result<bool, E> {
        self.sda.set_high()?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        let ack = self.sda.is_low()?;
        self.scl.set_low()?;

        Ok(ack)
    }

    fn read(&mut self) -> Result<u8, E> {
        self.sda.set_high()?;

        let mut byte = 0u8;
        for _ in 0..8 {
            self.wait();
            self.scl.set_high()?;
            self.wait();
            byte = (byte << 1) | u8::from(self.sda.is_high()?);
            self.scl.set_low()?;
        }

        Ok(byte)
    }

    fn send_ack(&mut self) -> Result<(), E> {
        self.sda.set_low()?;
        self.clock_pulse()?;
        self.sda.set_high()
    }

    fn send_nack(&mut self) -> Result<(), E> {
        self.sda.set_high()?;
        self.clock_pulse()
    }

    fn stop(&mut self) -> Result<(), E> {
        self.sda.set_low()?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        self.sda.set_high()
    }
}
