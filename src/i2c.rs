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

//! Bit-level I2C primitives and the transaction state machine built on them.
//!
//! The BQ32000 driver doesn't talk to an I2C controller through buffers.
//! Instead, it issues the individual bus conditions itself, the way a
//! point-to-point master on a microcontroller does: START, address byte,
//! ACK wait, data bytes, repeated START, reads with ACK or NACK, and STOP.
//! Anything that can produce those conditions implements [`Bus`].
//!
//! ## Transactions
//!
//! [`Transaction`] walks a [`Bus`] through one complete exchange with a
//! single slave device:
//!
//! Idle → START → Address + R/W Bit → ACK → (Outgoing Bytes, each ACKed |
//! Repeated START → Address + Read Bit → ACK → Incoming Bytes, ACK after
//! each except the last, which is NACKed) → STOP → Idle
//!
//! Every outgoing byte is followed by an ACK wait, and a missing ACK aborts
//! the transaction with [`Error::Nack`]. A `Transaction` that's dropped before
//! [`end`] is called, including one that was aborted by an error, issues a
//! STOP condition to release the bus.
//!
//! ## Bit-banged bus
//!
//! With the `hal` feature enabled, [`SoftI2c`] implements [`Bus`] on top of
//! two `embedded-hal` GPIO pins and a delay.
//!
//! [`end`]: struct.Transaction.html#method.end
//! [`SoftI2c`]: struct.SoftI2c.html

use std::error;
use std::fmt;
use std::result;

use log::trace;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "hal")]
mod soft;

#[cfg(feature = "hal")]
pub use self::soft::SoftI2c;

/// Errors that can occur during an I2C transaction.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error<E> {
    /// The slave device didn't acknowledge a byte.
    ///
    /// This covers the address byte as well as register selection and data
    /// bytes. The transaction was aborted and the bus released.
    Nack,
    /// The underlying [`Bus`] implementation returned an error.
    ///
    /// [`Bus`]: trait.Bus.html
    Bus(E),
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Nack => write!(f, "Slave device didn't acknowledge"),
            Error::Bus(ref err) => write!(f, "Bus error: {}", err),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> error::Error for Error<E> {}

/// Result type returned from methods that can have `i2c::Error`s.
pub type Result<T, E> = result::Result<T, Error<E>>;

/// Bus conditions a master needs to address a slave device.
///
/// Implementations are expected to block until each condition has been
/// placed on the bus. Bounding a hang (for instance a slave holding SDA low)
/// is up to the implementation.
pub trait Bus {
    /// Error type returned by the bus primitives.
    type Error;

    /// Issues a START condition. Also used for repeated START.
    fn start(&mut self) -> result::Result<(), Self::Error>;

    /// Shifts out one byte, MSB first.
    fn write(&mut self, byte: u8) -> result::Result<(), Self::Error>;

    /// Clocks in the acknowledge bit that follows an outgoing byte.
    ///
    /// Returns `true` if the slave device pulled SDA low (ACK).
    fn await_ack(&mut self) -> result::Result<bool, Self::Error>;

    /// Shifts in one byte, MSB first.
    fn read(&mut self) -> result::Result<u8, Self::Error>;

    /// Drives an ACK after an incoming byte, requesting another byte.
    fn send_ack(&mut self) -> result::Result<(), Self::Error>;

    /// Drives a NACK after an incoming byte, ending the read.
    fn send_nack(&mut self) -> result::Result<(), Self::Error>;

    /// Issues a STOP condition.
    fn stop(&mut self) -> result::Result<(), Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    type Error = B::Error;

    fn start(&mut self) -> result::Result<(), Self::Error> {
        B::start(self)
    }

    fn write(&mut self, byte: u8) -> result::Result<(), Self::Error> {
        B::write(self, byte)
    }

    fn await_ack(&mut self) -> result::Result<bool, Self::Error> {
        B::await_ack(self)
    }

    fn read(&mut self) -> result::Result<u8, Self::Error> {
        B::read(self)
    }

    fn send_ack(&mut self) -> result::Result<(), Self::Error> {
        B::send_ack(self)
    }

    fn send_nack(&mut self) -> result::Result<(), Self::Error> {
        B::send_nack(self)
    }

    fn stop(&mut self) -> result::Result<(), Self::Error> {
        B::stop(self)
    }
}

/// Transfer direction, carried in the R/W bit of the address byte.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Direction {
    /// Master to slave. R/W bit cleared.
    Write,
    /// Slave to master. R/W bit set.
    Read,
}

impl Direction {
    /// Returns the address byte for `address`, an 8-bit slave address
    /// (7-bit address shifted left by 1), with the R/W bit set accordingly.
    pub fn address_byte(self, address: u8) -> u8 {
        match self {
            Direction::Write => address & 0xFE,
            Direction::Read => address | 0x01,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum State {
    Idle,
    Start,
    AddressSent(Direction),
    Data(Direction),
    // Last incoming byte was NACKed
    ReadDone,
}

/// A single I2C transaction with one slave device.
///
/// A `Transaction` is opened with [`begin`], which issues a START condition
/// and addresses the slave device for writing. [`restart`] switches direction
/// with a repeated START, without releasing the bus. [`end`] issues the STOP
/// condition.
///
/// If a `Transaction` goes out of scope without [`end`] being called, a STOP
/// condition is issued when it's dropped. This makes sure the bus is released
/// when any step returns early with an error.
///
/// [`begin`]: #method.begin
/// [`restart`]: #method.restart
/// [`end`]: #method.end
#[derive(Debug)]
pub struct Transaction<'a, B: Bus> {
    bus: &'a mut B,
    address: u8,
    state: State,
}

impl<'a, B: Bus> Transaction<'a, B> {
    /// Opens a transaction with the slave device at the 8-bit `address`.
    ///
    /// Sequence: START → Address + Write Bit → ACK
    pub fn begin(bus: &'a mut B, address: u8) -> Result<Transaction<'a, B>, B::Error> {
        trace!("I2C transaction with {:#04x}", address);

        let mut transaction = Transaction {
            bus,
            address,
            state: State::Idle,
        };

        transaction.start(Direction::Write)?;

        Ok(transaction)
    }

    /// Issues a repeated START and re-addresses the slave device.
    ///
    /// Sequence: Repeated START → Address + R/W Bit → ACK
    pub fn restart(&mut self, direction: Direction) -> Result<(), B::Error> {
        debug_assert!(self.state != State::Idle);

        self.start(direction)
    }

    /// Sends an outgoing byte and waits for the slave device to ACK it.
    ///
    /// Sequence: Outgoing Byte → ACK
    pub fn write(&mut self, byte: u8) -> Result<(), B::Error> {
        debug_assert!(matches!(
            self.state,
            State::AddressSent(Direction::Write) | State::Data(Direction::Write)
        ));

        self.transmit(byte)?;
        self.state = State::Data(Direction::Write);

        Ok(())
    }

    /// Sends each byte in `bytes`, stopping at the first byte that isn't
    /// acknowledged.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), B::Error> {
        for &byte in bytes {
            self.write(byte)?;
        }

        Ok(())
    }

    /// Receives an incoming byte and ACKs it, so the slave device continues
    /// with the next byte.
    ///
    /// Sequence: Incoming Byte → ACK
    pub fn read(&mut self) -> Result<u8, B::Error> {
        debug_assert!(matches!(
            self.state,
            State::AddressSent(Direction::Read) | State::Data(Direction::Read)
        ));

        let byte = self.bus.read().map_err(Error::Bus)?;
        self.bus.send_ack().map_err(Error::Bus)?;
        self.state = State::Data(Direction::Read);

        Ok(byte)
    }

    /// Receives the final incoming byte and NACKs it, which tells the slave
    /// device to stop sending.
    ///
    /// Sequence: Incoming Byte → NACK
    pub fn read_last(&mut self) -> Result<u8, B::Error> {
        debug_assert!(matches!(
            self.state,
            State::AddressSent(Direction::Read) | State::Data(Direction::Read)
        ));

        let byte = self.bus.read().map_err(Error::Bus)?;
        self.bus.send_nack().map_err(Error::Bus)?;
        self.state = State::ReadDone;

        Ok(byte)
    }

    /// Closes the transaction with a STOP condition.
    pub fn end(mut self) -> Result<(), B::Error> {
        self.state = State::Idle;
        trace!("I2C transaction with {:#04x} done", self.address);

        self.bus.stop().map_err(Error::Bus)
    }

    fn start(&mut self, direction: Direction) -> Result<(), B::Error> {
        self.state = State::Start;
        self.bus.start().map_err(Error::Bus)?;
        self.transmit(direction.address_byte(self.address))?;
        self.state = State::AddressSent(direction);

        Ok(())
    }

    fn transmit(&mut self, byte: u8) -> Result<(), B::Error> {
        self.bus.write(byte).map_err(Error::Bus)?;

        if self.bus.await_ack().map_err(Error::Bus)? {
            Ok(())
        } else {
            Err(Error::Nack)
        }
    }
}

impl<B: Bus> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        if self.state != State::Idle {
            trace!("I2C transaction with {:#04x} aborted", self.address);

            // The caller already has the error that aborted the transaction
            let _ = self.bus.stop();
        }
    }
}
