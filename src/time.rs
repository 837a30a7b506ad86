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

use std::fmt;

const SECONDS_PER_DAY: u32 = 86_400;

/// A 24-hour time of day.
///
/// `Time` is a plain value. It isn't validated on construction, and the
/// driver writes whatever fields it's given. Use [`is_valid`] to check the
/// ranges before writing a time to the chip.
///
/// [`is_valid`]: #method.is_valid
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Hash)]
pub struct Time {
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
}

impl Time {
    /// Constructs a new `Time`.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Time {
        Time {
            hour,
            minute,
            second,
        }
    }

    /// Returns `true` if every field is within its 24-hour clock range.
    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }

    pub(crate) fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    // How many seconds self is ahead of earlier, wrapping at midnight.
    pub(crate) fn seconds_after(&self, earlier: &Time) -> u32 {
        let now = self.seconds_of_day() % SECONDS_PER_DAY;
        let then = earlier.seconds_of_day() % SECONDS_PER_DAY;

        (now + SECONDS_PER_DAY - then) % SECONDS_PER_DAY
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl From<(u8, u8, u8)> for Time {
    fn from((hour, minute, second): (u8, u8, u8)) -> Time {
        Time::new(hour, minute, second)
    }
}

impl From<Time> for (u8, u8, u8) {
    fn from(time: Time) -> (u8, u8, u8) {
        (time.hour, time.minute, time.second)
    }
}
