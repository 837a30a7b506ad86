// Simulated BQ32000 on the slave side of a bit-level bus

use std::convert::Infallible;

use bq3200x::Bus;

const REGISTERS: usize = 10;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum Phase {
    Idle,
    Address,
    Register,
    Write,
    Read,
    // Addressed to some other device
    Ignored,
}

#[derive(Debug)]
pub struct Bq32000 {
    pub registers: [u8; REGISTERS],
    address: u8,
    pointer: usize,
    phase: Phase,
    ack: bool,
    bytes_received: usize,
    // Byte index (counted over the chip's lifetime) that gets NACKed once
    glitch_at: Option<usize>,
    pub starts: usize,
    pub stops: usize,
    pub nacks_sent: usize,
}

impl Bq32000 {
    pub fn new() -> Bq32000 {
        Bq32000 {
            // STOP set, as after a cold start without battery
            registers: [0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            address: 0xD0,
            pointer: 0,
            phase: Phase::Idle,
            ack: false,
            bytes_received: 0,
            glitch_at: None,
            starts: 0,
            stops: 0,
            nacks_sent: 0,
        }
    }

    pub fn glitch_at(mut self, index: usize) -> Bq32000 {
        self.glitch_at = Some(index);
        self
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    fn receive(&mut self, byte: u8) -> bool {
        match self.phase {
            Phase::Address if byte & 0xFE == self.address => {
                self.phase = if byte & 0x01 == 0 {
                    Phase::Register
                } else {
                    Phase::Read
                };
                true
            }
            Phase::Address => {
                self.phase = Phase::Ignored;
                false
            }
            Phase::Register => {
                self.pointer = usize::from(byte) % REGISTERS;
                self.phase = Phase::Write;
                true
            }
            Phase::Write => {
                self.registers[self.pointer] = byte;
                self.pointer = (self.pointer + 1) % REGISTERS;
                true
            }
            Phase::Idle | Phase::Read | Phase::Ignored => false,
        }
    }
}

impl Bus for Bq32000 {
    type Error = Infallible;

    fn start(&mut self) -> Result<(), Infallible> {
        self.starts += 1;
        self.phase = Phase::Address;
        Ok(())
    }

    fn write(&mut self, byte: u8) -> Result<(), Infallible> {
        let index = self.bytes_received;
        self.bytes_received += 1;

        if self.glitch_at == Some(index) {
            self.glitch_at = None;
            self.phase = Phase::Ignored;
            self.ack = false;
        } else {
            self.ack = self.receive(byte);
        }

        Ok(())
    }

    fn await_ack(&mut self) -> Result<bool, Infallible> {
        Ok(self.ack)
    }

    fn read(&mut self) -> Result<u8, Infallible> {
        if self.phase != Phase::Read {
            return Ok(0xFF);
        }

        let byte = self.registers[self.pointer];
        self.pointer = (self.pointer + 1) % REGISTERS;

        Ok(byte)
    }

    fn send_ack(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn send_nack(&mut self) -> Result<(), Infallible> {
        self.nacks_sent += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Infallible> {
        self.stops += 1;
        self.phase = Phase::Idle;
        Ok(())
    }
}
