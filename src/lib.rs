//! BQ3200x is a driver for the Texas Instruments BQ32000 real-time clock, a
//! battery-backed clock/calendar chip with an I2C interface.
//!
//! The driver starts the chip's oscillator, writes the time of day (hours,
//! minutes and seconds, 24-hour mode) and reads it back. It drives the bus one
//! condition at a time (START, address, ACK, data, repeated START, STOP)
//! through the [`Bus`] trait, so it can run on anything that can produce
//! those conditions, from a microcontroller's I2C peripheral to two GPIO pins.
//!
//! A bit-banged [`SoftI2c`] bus built on `embedded-hal` pins, and a
//! [`Delay`] for running it on a Linux host, are available with the `hal`
//! feature.
//!
//! ```ignore
//! use bq3200x::{Rtc, Time};
//!
//! let mut rtc = Rtc::new(bus);
//! rtc.init()?;
//! rtc.write_time(Time::new(14, 7, 33))?;
//! println!("{}", rtc.read_time()?);
//! ```
//!
//! [`Bus`]: i2c/trait.Bus.html
//! [`SoftI2c`]: i2c/struct.SoftI2c.html
//! [`Delay`]: hal/struct.Delay.html

// Used by rustdoc to link other crates to bq3200x's docs
#![doc(html_root_url = "https://docs.rs/bq3200x/0.1.0")]

pub mod bcd;
#[cfg(feature = "hal")]
pub mod hal;
pub mod i2c;
pub mod rtc;
mod time;

pub use crate::bcd::Layout;
pub use crate::i2c::Bus;
pub use crate::rtc::{Rtc, WritePolicy};
pub use crate::time::Time;
