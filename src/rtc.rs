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

//! Interface for the BQ32000 real-time clock.
//!
//! The BQ32000 keeps time in BCD registers that are backed by a battery while
//! the host is powered down. [`Rtc`] starts the chip's oscillator, writes the
//! hour, minute and second, and reads them back. The date registers,
//! calibration and square-wave output aren't used.
//!
//! Both [`write_time`] and [`read_time`] select the seconds register once and
//! rely on the chip's register auto-increment to reach the minutes and hours
//! registers, so each operation is a single I2C transaction.
//!
//! ## Partial writes
//!
//! The chip latches every time register as soon as its byte is acknowledged.
//! If a [`write_time`] transaction fails halfway, the registers written before
//! the failure keep their new values, and the chip holds a mix of the old and
//! new time. The error doesn't say which step failed. Callers that need the
//! write to be all-or-nothing can enable [`WritePolicy::Verify`], which reads
//! the time back and repeats the write until it sticks.
//!
//! [`Rtc`]: struct.Rtc.html
//! [`write_time`]: struct.Rtc.html#method.write_time
//! [`read_time`]: struct.Rtc.html#method.read_time
//! [`WritePolicy::Verify`]: enum.WritePolicy.html#variant.Verify

use std::error;
use std::fmt;
use std::result;

use log::{debug, warn};

use crate::bcd::Layout;
use crate::i2c::{self, Bus, Direction, Transaction};
use crate::time::Time;

/// BQ32000 slave address, including the R/W bit position (7-bit address `0x68`).
pub const DEFAULT_ADDRESS: u8 = 0xD0;

// Time register map. Registers auto-increment after each byte.
const REG_SECONDS: u8 = 0x00;
const REG_MINUTES: u8 = 0x01;

// Minutes register, bit 7
const OSC_FAIL: u8 = 0x80;

// A verified read-back may run this far ahead of the written time
const VERIFY_TOLERANCE_SECS: u32 = 2;

/// Errors that can occur when accessing the BQ32000.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error<E> {
    /// The BQ32000 didn't acknowledge its address, a register address or a
    /// data byte.
    Nack,
    /// The underlying bus returned an error.
    Bus(E),
    /// The time read back after a write doesn't match the time written.
    ///
    /// Only returned when the write policy is set to [`WritePolicy::Verify`].
    ///
    /// [`WritePolicy::Verify`]: enum.WritePolicy.html#variant.Verify
    Verify {
        /// Time the registers should hold after the write.
        expected: Time,
        /// Time read back from the registers.
        actual: Time,
    },
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Nack => write!(f, "BQ32000 didn't acknowledge"),
            Error::Bus(ref err) => write!(f, "Bus error: {}", err),
            Error::Verify { expected, actual } => write!(
                f,
                "Time read back as {}, expected {}",
                actual, expected
            ),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> error::Error for Error<E> {}

impl<E> From<i2c::Error<E>> for Error<E> {
    fn from(err: i2c::Error<E>) -> Error<E> {
        match err {
            i2c::Error::Nack => Error::Nack,
            i2c::Error::Bus(err) => Error::Bus(err),
        }
    }
}

/// Result type returned from methods that can have `rtc::Error`s.
pub type Result<T, E> = result::Result<T, Error<E>>;

/// Controls how [`write_time`] deals with failed or partial writes.
///
/// [`write_time`]: struct.Rtc.html#method.write_time
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum WritePolicy {
    /// Write the time registers in a single attempt, and return any error
    /// as is.
    #[default]
    Once,
    /// Read the time registers back after writing them. If the write
    /// failed, or the registers don't hold the written time, try again, up
    /// to `retries` more times.
    ///
    /// A read-back that's at most 2 seconds ahead of the written time counts
    /// as a match, since the clock keeps running in between.
    Verify {
        /// Number of additional attempts.
        retries: u8,
    },
}

/// Provides access to a BQ32000 real-time clock.
///
/// `Rtc` owns (or borrows, through `&mut B`) a [`Bus`] for its lifetime, and
/// assumes nothing else drives the bus while one of its methods runs. Every
/// method opens and closes its own transaction, and nothing is cached in
/// between.
///
/// [`Bus`]: ../i2c/trait.Bus.html
#[derive(Debug)]
pub struct Rtc<B> {
    bus: B,
    address: u8,
    layout: Layout,
    write_policy: WritePolicy,
}

impl<B: Bus> Rtc<B> {
    /// Constructs a new `Rtc` on `bus`, using the default slave address.
    pub fn new(bus: B) -> Rtc<B> {
        Rtc::with_address(bus, DEFAULT_ADDRESS)
    }

    /// Constructs a new `Rtc` on `bus`, using the 8-bit slave `address`.
    ///
    /// The R/W bit of `address` is ignored. It's cleared or set for each
    /// transfer as needed.
    pub fn with_address(bus: B, address: u8) -> Rtc<B> {
        Rtc {
            bus,
            address,
            layout: Layout::default(),
            write_policy: WritePolicy::default(),
        }
    }

    /// Returns the 8-bit slave address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Returns the register bit layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Sets the register bit layout.
    ///
    /// By default, `layout` is set to [`Layout::Compat`].
    ///
    /// [`Layout::Compat`]: ../bcd/enum.Layout.html#variant.Compat
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Returns the write policy.
    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Sets the write policy.
    ///
    /// By default, `write_policy` is set to [`WritePolicy::Once`].
    ///
    /// [`WritePolicy::Once`]: enum.WritePolicy.html#variant.Once
    pub fn set_write_policy(&mut self, write_policy: WritePolicy) {
        self.write_policy = write_policy;
    }

    /// Consumes the `Rtc`, returning the bus.
    pub fn release(self) -> B {
        self.bus
    }

    /// Starts the oscillator.
    ///
    /// Clears the STOP bit in the seconds register, which also resets the
    /// seconds to 0. The chip runs in 24-hour mode with battery backup
    /// enabled. The time isn't set, call [`write_time`] afterwards.
    ///
    /// Sequence: START → Address + Write Bit → Seconds Register → 0x00 → STOP
    ///
    /// [`write_time`]: #method.write_time
    pub fn init(&mut self) -> Result<(), B::Error> {
        let mut transaction = Transaction::begin(&mut self.bus, self.address)?;
        transaction.write(REG_SECONDS)?;
        transaction.write(0x00)?;
        transaction.end()?;

        debug!("BQ32000 oscillator started");

        Ok(())
    }

    /// Writes `time` to the hours, minutes and seconds registers.
    ///
    /// `time` isn't validated. Fields outside of their range are encoded
    /// anyway, and may end up setting control bits.
    ///
    /// If an error occurs after the seconds or minutes register was written,
    /// those registers keep their new values. More information can be found
    /// [here].
    ///
    /// Sequence: START → Address + Write Bit → Seconds Register → Seconds →
    /// Minutes → Hours → STOP
    ///
    /// [here]: index.html#partial-writes
    pub fn write_time(&mut self, time: Time) -> Result<(), B::Error> {
        match self.write_policy {
            WritePolicy::Once => self.write_registers(time)?,
            WritePolicy::Verify { retries } => self.write_verified(time, retries)?,
        }

        debug!("BQ32000 time set to {}", time);

        Ok(())
    }

    /// Reads the time from the hours, minutes and seconds registers.
    ///
    /// Register bytes aren't checked. A register that holds an invalid BCD
    /// value returns whatever its digits add up to.
    ///
    /// Sequence: START → Address + Write Bit → Seconds Register → Repeated
    /// START → Address + Read Bit → Seconds → Minutes → Hours → STOP
    pub fn read_time(&mut self) -> Result<Time, B::Error> {
        let layout = self.layout;

        let mut transaction = Transaction::begin(&mut self.bus, self.address)?;
        transaction.write(REG_SECONDS)?;
        transaction.restart(Direction::Read)?;
        let second = layout.decode_seconds(transaction.read()?);
        let minute = layout.decode_minutes(transaction.read()?);
        let hour = layout.decode_hours(transaction.read_last()?);
        transaction.end()?;

        Ok(Time::new(hour, minute, second))
    }

    /// Returns `true` if the oscillator fail (OF) flag is set.
    ///
    /// The BQ32000 sets OF when its oscillator stopped at some point, for
    /// instance because both main power and battery were lost. The time
    /// registers can't be trusted until the time is written again.
    ///
    /// Sequence: START → Address + Write Bit → Minutes Register → Repeated
    /// START → Address + Read Bit → Minutes → STOP
    pub fn oscillator_failed(&mut self) -> Result<bool, B::Error> {
        let mut transaction = Transaction::begin(&mut self.bus, self.address)?;
        transaction.write(REG_MINUTES)?;
        transaction.restart(Direction::Read)?;
        let minutes = transaction.read_last()?;
        transaction.end()?;

        Ok(minutes & OSC_FAIL != 0)
    }

    /// Reads the time and returns it as a line of text.
    ///
    /// See [`report`] for the format.
    ///
    /// [`report`]: fn.report.html
    pub fn read_test(&mut self) -> String {
        report(&self.read_time())
    }

    fn write_registers(&mut self, time: Time) -> Result<(), B::Error> {
        let registers = [
            self.layout.encode_seconds(time.second),
            self.layout.encode_minutes(time.minute),
            self.layout.encode_hours(time.hour),
        ];

        let mut transaction = Transaction::begin(&mut self.bus, self.address)?;
        transaction.write(REG_SECONDS)?;
        transaction.write_all(&registers)?;
        transaction.end()?;

        Ok(())
    }

    fn write_verified(&mut self, time: Time, retries: u8) -> Result<(), B::Error> {
        // The registers hold the time as the layout encodes it, which isn't
        // always the time that was passed in.
        let expected = Time::new(
            self.layout.decode_hours(self.layout.encode_hours(time.hour)),
            self.layout.decode_minutes(self.layout.encode_minutes(time.minute)),
            self.layout.decode_seconds(self.layout.encode_seconds(time.second)),
        );

        let mut attempt = 0;
        loop {
            match self.write_and_compare(time, expected) {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= retries => return Err(err),
                Err(_) => {
                    attempt += 1;
                    warn!(
                        "BQ32000 time write not confirmed, retrying ({}/{})",
                        attempt, retries
                    );
                }
            }
        }
    }

    fn write_and_compare(&mut self, time: Time, expected: Time) -> Result<(), B::Error> {
        self.write_registers(time)?;
        let actual = self.read_time()?;

        if actual.seconds_after(&expected) <= VERIFY_TOLERANCE_SECS {
            Ok(())
        } else {
            Err(Error::Verify { expected, actual })
        }
    }
}

/// Formats the result of [`Rtc::read_time`] as a line of text.
///
/// Returns `RTC: HH:MM:SS` for a successful read, and `RTC read fail`
/// otherwise.
///
/// [`Rtc::read_time`]: struct.Rtc.html#method.read_time
pub fn report<E>(result: &Result<Time, E>) -> String {
    match result {
        Ok(time) => format!("RTC: {}", time),
        Err(_) => String::from("RTC read fail"),
    }
}
