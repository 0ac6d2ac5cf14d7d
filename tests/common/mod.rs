//! Host doubles for the clock's peripherals.
#![allow(dead_code, reason = "Each test binary uses a subset")]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embassy_futures::yield_now;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal::spi::{self, ErrorKind};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{Operation, SpiDevice};
use nixie_clock::{
    ALARM1_BUTTON_LEVEL, ALARM2_BUTTON_LEVEL, AnalogInputs, AnalogLine, BlockStorage, Button,
    DOWN_BUTTON_LEVEL, Error, FRONT_SAMPLE_COUNT, MODE_BUTTON_LEVEL, Result, SET_BUTTON_LEVEL,
    UP_BUTTON_LEVEL,
};

/// Level of a ladder with nothing pressed.
pub const IDLE_LEVEL: u16 = 1023;

/// Analog lines driven by a script of buttons, one entry per poll.
///
/// A poll always starts with [`FRONT_SAMPLE_COUNT`] front-line reads, so every
/// such batch advances the script. An empty script means nothing is pressed.
pub struct ScriptedAnalog {
    script: VecDeque<Button>,
    current: Button,
    front_reads: u32,
    pub light: u16,
    pub light_reads: Rc<Cell<u32>>,
}

impl ScriptedAnalog {
    pub fn new(script: &[Button]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            current: Button::None,
            front_reads: 0,
            light: 830,
            light_reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_light(mut self, light: u16) -> Self {
        self.light = light;
        self
    }

    fn line_level(&self, line: AnalogLine) -> u16 {
        let (button_line, level) = match self.current {
            Button::Alarm1 => (AnalogLine::FrontButtons, ALARM1_BUTTON_LEVEL),
            Button::Up => (AnalogLine::FrontButtons, UP_BUTTON_LEVEL),
            Button::Down => (AnalogLine::FrontButtons, DOWN_BUTTON_LEVEL),
            Button::Alarm2 => (AnalogLine::FrontButtons, ALARM2_BUTTON_LEVEL),
            Button::Mode => (AnalogLine::RearButtons, MODE_BUTTON_LEVEL),
            Button::Set => (AnalogLine::RearButtons, SET_BUTTON_LEVEL),
            Button::None => return IDLE_LEVEL,
        };
        if button_line == line { level } else { IDLE_LEVEL }
    }
}

impl AnalogInputs for ScriptedAnalog {
    async fn read(&mut self, line: AnalogLine) -> Result<u16> {
        match line {
            AnalogLine::FrontButtons => {
                if self.front_reads % u32::from(FRONT_SAMPLE_COUNT) == 0 {
                    self.current = self.script.pop_front().unwrap_or(Button::None);
                }
                self.front_reads += 1;
                Ok(self.line_level(line))
            }
            AnalogLine::RearButtons => Ok(self.line_level(line)),
            AnalogLine::LightSensor => {
                self.light_reads.set(self.light_reads.get() + 1);
                Ok(self.light)
            }
        }
    }
}

/// A delay that returns after one yield and totals the time asked for.
#[derive(Clone, Default)]
pub struct MockDelay {
    pub elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns.get() / 1_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
        yield_now().await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000)).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000)).await;
    }
}

/// Shared record of every pin write, in order.
pub type PinLog = Rc<RefCell<Vec<(&'static str, bool)>>>;

pub struct RecordingPin {
    name: &'static str,
    log: PinLog,
}

impl RecordingPin {
    pub fn new(name: &'static str, log: &PinLog) -> Self {
        Self {
            name,
            log: Rc::clone(log),
        }
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.log.borrow_mut().push((self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.log.borrow_mut().push((self.name, true));
        Ok(())
    }
}

/// The states written to one named pin.
pub fn writes_to(log: &PinLog, name: &str) -> Vec<bool> {
    log.borrow()
        .iter()
        .filter(|(pin, _)| *pin == name)
        .map(|(_, high)| *high)
        .collect()
}

/// Tube driver pins sharing one log.
pub fn recording_tubes(log: &PinLog) -> nixie_clock::NixieTubes<RecordingPin> {
    nixie_clock::NixieTubes::new(
        RecordingPin::new("data", log),
        RecordingPin::new("clock", log),
        RecordingPin::new("strobe", log),
        RecordingPin::new("dp", log),
    )
}

/// PWM channel with a 0-255 range that records every duty.
#[derive(Clone, Default)]
pub struct RecordingPwm {
    pub duties: Rc<RefCell<Vec<u16>>>,
}

impl pwm::ErrorType for RecordingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Self::Error> {
        self.duties.borrow_mut().push(duty);
        Ok(())
    }
}

/// A register file behind an SPI device, addressed like the DS3234: the first
/// byte of a transaction picks the register, bit 7 set means write, and the
/// address auto-increments.
#[derive(Clone, Default)]
pub struct RegisterSpi {
    pub registers: Rc<RefCell<[u8; 0x20]>>,
    /// Bytes written by each transaction.
    pub transactions: Rc<RefCell<Vec<Vec<u8>>>>,
    pub fail: bool,
}

impl spi::ErrorType for RegisterSpi {
    type Error = ErrorKind;
}

impl SpiDevice for RegisterSpi {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> core::result::Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        let mut written = Vec::new();
        let mut address: Option<usize> = None;
        let mut registers = self.registers.borrow_mut();
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for byte in bytes.iter() {
                        written.push(*byte);
                        match address {
                            None => address = Some(usize::from(*byte)),
                            Some(raw) => {
                                registers[(raw & 0x7F) % 0x20] = *byte;
                                address = Some(raw + 1);
                            }
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for slot in buffer.iter_mut() {
                        let raw = address.unwrap_or(0);
                        *slot = registers[(raw & 0x7F) % 0x20];
                        address = Some(raw + 1);
                    }
                }
                _ => {}
            }
        }
        self.transactions.borrow_mut().push(written);
        Ok(())
    }
}

/// Byte-addressed storage in RAM, erased to `0xFF`.
#[derive(Clone)]
pub struct MemoryStorage {
    pub bytes: Rc<RefCell<[u8; 64]>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            bytes: Rc::new(RefCell::new([0xFF; 64])),
        }
    }
}

impl MemoryStorage {
    pub fn with_contents(offset: usize, contents: &[u8]) -> Self {
        let storage = Self::default();
        storage.bytes.borrow_mut()[offset..offset + contents.len()].copy_from_slice(contents);
        storage
    }

    pub fn contents(&self, offset: usize, len: usize) -> Vec<u8> {
        self.bytes.borrow()[offset..offset + len].to_vec()
    }
}

impl BlockStorage for MemoryStorage {
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::Storage)?;
        let source = self.bytes.borrow();
        let slice = source
            .get(start..start + bytes.len())
            .ok_or(Error::Storage)?;
        bytes.copy_from_slice(slice);
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::Storage)?;
        let mut target = self.bytes.borrow_mut();
        target
            .get_mut(start..start + bytes.len())
            .ok_or(Error::Storage)?
            .copy_from_slice(bytes);
        Ok(())
    }
}
