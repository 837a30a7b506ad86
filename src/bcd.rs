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

//! Binary-coded decimal conversion for the BQ32000 time registers.
//!
//! Each time register stores its value as two BCD digits, with the tens digit
//! packed above the ones digit and a status or control bit sharing the byte:
//!
//! | Register | Bit 7            | Tens digit | Ones digit |
//! |----------|------------------|------------|------------|
//! | Seconds  | STOP (oscillator)| 0-5        | bits 3-0   |
//! | Minutes  | OF (osc. fail)   | 0-5        | bits 3-0   |
//! | Hours    | CENT_EN (+ CENT) | 0-2        | bits 3-0   |
//!
//! The free functions in this module implement the packing used by existing
//! BlueJay firmware: the tens digit is shifted left by 6 for seconds and
//! minutes, and by 5 for hours. Values are bit-exact with bytes written by that
//! firmware, which also means tens digits above 3 (seconds or minutes 40-59)
//! lose their high bit when shifted into a `u8`. Seconds or minutes with a
//! tens digit of 2 or 3 set bit 7 (seconds 20-39 stop the oscillator), and
//! hours 20-23 set bit 6.
//! Decoding shifts the same amounts back, so bit 7 of the seconds and minutes
//! registers contributes to the tens digit, while bits 5-4 are ignored.
//!
//! [`Layout::Datasheet`] packs the tens digit at bit 4 as the datasheet
//! describes, and never touches the STOP, OF or century bits.
//!
//! None of the encoders validate their input. Values outside 0-59 (seconds,
//! minutes) or 0-23 (hours) produce whatever bits the shift and mask leave
//! behind, and it's up to the caller to pass in a valid time.

/// Decodes the seconds register.
#[inline]
pub fn decode_seconds(byte: u8) -> u8 {
    10 * ((byte >> 6) & 0x03) + (byte & 0x0F)
}

/// Decodes the minutes register.
#[inline]
pub fn decode_minutes(byte: u8) -> u8 {
    10 * ((byte >> 6) & 0x03) + (byte & 0x0F)
}

/// Decodes the hours register (24-hour mode).
#[inline]
pub fn decode_hours(byte: u8) -> u8 {
    10 * (byte >> 5) + (byte & 0x0F)
}

/// Encodes `second` for the seconds register. The STOP bit is left cleared,
/// which keeps the oscillator running.
#[inline]
pub fn encode_seconds(second: u8) -> u8 {
    // Tens digits above 3 don't fit above bit 6 and are truncated.
    ((second / 10) << 6) | (second % 10)
}

/// Encodes `minute` for the minutes register. The read-only OF flag is
/// written as 0.
#[inline]
pub fn encode_minutes(minute: u8) -> u8 {
    ((minute / 10) << 6) | (minute % 10)
}

/// Encodes `hour` for the hours register (24-hour mode).
#[inline]
pub fn encode_hours(hour: u8) -> u8 {
    ((hour / 10) << 5) | (hour % 10)
}

/// Bit layout used to pack the time registers.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Layout {
    /// Tens digit shifted by 6 (seconds, minutes) or 5 (hours). Bit-exact
    /// with the BlueJay firmware. See the [module documentation](index.html).
    #[default]
    Compat,
    /// Tens digit at bits 6-4 (seconds, minutes) or 5-4 (hours), as laid out
    /// in the BQ32000 datasheet.
    Datasheet,
}

impl Layout {
    /// Encodes `second` for the seconds register.
    pub fn encode_seconds(self, second: u8) -> u8 {
        match self {
            Layout::Compat => encode_seconds(second),
            Layout::Datasheet => pack(second, 0x07),
        }
    }

    /// Encodes `minute` for the minutes register.
    pub fn encode_minutes(self, minute: u8) -> u8 {
        match self {
            Layout::Compat => encode_minutes(minute),
            Layout::Datasheet => pack(minute, 0x07),
        }
    }

    /// Encodes `hour` for the hours register.
    pub fn encode_hours(self, hour: u8) -> u8 {
        match self {
            Layout::Compat => encode_hours(hour),
            Layout::Datasheet => pack(hour, 0x03),
        }
    }

    /// Decodes the seconds register.
    pub fn decode_seconds(self, byte: u8) -> u8 {
        match self {
            Layout::Compat => decode_seconds(byte),
            Layout::Datasheet => unpack(byte, 0x07),
        }
    }

    /// Decodes the minutes register.
    pub fn decode_minutes(self, byte: u8) -> u8 {
        match self {
            Layout::Compat => decode_minutes(byte),
            Layout::Datasheet => unpack(byte, 0x07),
        }
    }

    /// Decodes the hours register.
    pub fn decode_hours(self, byte: u8) -> u8 {
        match self {
            Layout::Compat => decode_hours(byte),
            Layout::Datasheet => unpack(byte, 0x03),
        }
    }
}

// Tens digit at bit 4, limited to tens_mask so flag bits stay clear
#[inline]
fn pack(value: u8, tens_mask: u8) -> u8 {
    (((value / 10) & tens_mask) << 4) | (value % 10)
}

#[inline]
fn unpack(byte: u8, tens_mask: u8) -> u8 {
    10 * ((byte >> 4) & tens_mask) + (byte & 0x0F)
}
