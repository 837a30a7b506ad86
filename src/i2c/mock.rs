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

// Recording Bus for unit tests

use std::collections::VecDeque;
use std::fmt;

use super::Bus;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) enum Event {
    Start,
    Write(u8),
    AwaitAck(bool),
    Read(u8),
    Ack,
    Nack,
    Stop,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock bus failure")
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockBus {
    events: Vec<Event>,
    reads: VecDeque<u8>,
    // Index of the ACK wait that sees a NACK
    nack_at: Option<usize>,
    acks: usize,
    fail_reads: bool,
}

impl MockBus {
    pub(crate) fn new() -> MockBus {
        MockBus::default()
    }

    pub(crate) fn with_reads(bytes: &[u8]) -> MockBus {
        MockBus {
            reads: bytes.iter().copied().collect(),
            ..MockBus::default()
        }
    }

    pub(crate) fn nack_at(mut self, index: usize) -> MockBus {
        self.nack_at = Some(index);
        self
    }

    pub(crate) fn fail_reads(mut self) -> MockBus {
        self.fail_reads = true;
        self
    }

    pub(crate) fn push_reads(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().copied());
    }

    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn count(&self, event: Event) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    // Every byte the master shifted out, address bytes included
    pub(crate) fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                Event::Write(byte) => Some(byte),
                _ => None,
            })
            .collect()
    }
}

impl Bus for MockBus {
    type Error = MockError;

    fn start(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Start);
        Ok(())
    }

    fn write(&mut self, byte: u8) -> Result<(), MockError> {
        self.events.push(Event::Write(byte));
        Ok(())
    }

    fn await_ack(&mut self) -> Result<bool, MockError> {
        let ack = self.nack_at != Some(self.acks);
        self.acks += 1;
        self.events.push(Event::AwaitAck(ack));
        Ok(ack)
    }

    fn read(&mut self) -> Result<u8, MockError> {
        if self.fail_reads {
            return Err(MockError);
        }

        // An idle bus reads as all ones
        let byte = self.reads.pop_front().unwrap_or(0xFF);
        self.events.push(Event::Read(byte));
        Ok(byte)
    }

    fn send_ack(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Ack);
        Ok(())
    }

    fn send_nack(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Nack);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Stop);
        Ok(())
    }
}
