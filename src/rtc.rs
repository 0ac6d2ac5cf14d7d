//! DS3234 real-time clock over SPI.
//!
//! The chip exposes seven timekeeping registers (seconds, minutes, hours,
//! weekday, day, month, year). Reads address `0x00..=0x06`; writes set bit 7
//! (`0x80..=0x86`). The weekday register is never touched.
//!
//! Every register packs two BCD digits: the ones digit in the low nibble and the
//! tens digit in the bits just above it. How many tens bits are meaningful
//! differs per register and the other high bits carry control flags (12/24-hour
//! select, century), so [`REGISTERS`] records the width for each one.

use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::date_time::{Date, Time};
use crate::{Error, Result};

/// Bit 7 of the address byte selects a write.
const WRITE_FLAG: u8 = 0x80;
/// Control register, write address.
const CONTROL_WRITE_ADDRESS: u8 = 0x8E;
/// 1 Hz square wave on INT/SQW (also on battery), temperature conversion on,
/// onboard alarms off, oscillator running.
const CONTROL_VALUE: u8 = 0x60;

/// Layout of one BCD register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcdRegister {
    /// Read address; the write address is `address | 0x80`.
    pub address: u8,
    /// Width of the ones digit, always the low nibble.
    pub ones_bits: u8,
    /// Width of the tens digit, stored directly above the ones digit.
    pub tens_bits: u8,
    /// Weight of one tens step.
    pub tens_scale: u8,
}

impl BcdRegister {
    const fn new(address: u8, tens_bits: u8) -> Self {
        Self {
            address,
            ones_bits: 4,
            tens_bits,
            tens_scale: 10,
        }
    }

    const fn ones_mask(self) -> u8 {
        (1 << self.ones_bits) - 1
    }

    const fn tens_mask(self) -> u8 {
        (1 << self.tens_bits) - 1
    }

    /// Pack a decimal value into this register's BCD layout.
    ///
    /// Hours are always written in 24-hour form: their 2-bit tens field is the
    /// literal tens digit (0, 1 or 2) and the 12/24 select bit stays clear.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "Divisor is the non-zero constant scale"
    )]
    pub const fn encode(self, value: u8) -> u8 {
        let tens = (value / self.tens_scale) & self.tens_mask();
        let ones = (value % self.tens_scale) & self.ones_mask();
        (tens << self.ones_bits) | ones
    }

    /// Inverse of [`encode`](Self::encode); control bits outside the digit fields are ignored.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "At most 15 * 10 + 15, well within u8"
    )]
    pub const fn decode(self, raw: u8) -> u8 {
        let tens = (raw >> self.ones_bits) & self.tens_mask();
        let ones = raw & self.ones_mask();
        tens * self.tens_scale + ones
    }
}

/// Seconds register.
pub const SECONDS: BcdRegister = BcdRegister::new(0x00, 3);
/// Minutes register.
pub const MINUTES: BcdRegister = BcdRegister::new(0x01, 3);
/// Hours register (24-hour mode).
pub const HOURS: BcdRegister = BcdRegister::new(0x02, 2);
/// Day-of-month register.
pub const DAY: BcdRegister = BcdRegister::new(0x04, 2);
/// Month register; bit 7 is the century flag and is ignored.
pub const MONTH: BcdRegister = BcdRegister::new(0x05, 1);
/// Two-digit year register.
pub const YEAR: BcdRegister = BcdRegister::new(0x06, 4);

/// Transfer order used by every read and write. Register 3 (weekday) is absent.
pub const REGISTERS: [BcdRegister; 6] = [SECONDS, MINUTES, HOURS, DAY, MONTH, YEAR];

/// Encode a date and time into raw register bytes, in [`REGISTERS`] order.
#[must_use]
pub const fn encode_registers(date: Date, time: Time) -> [u8; 6] {
    [
        SECONDS.encode(time.seconds),
        MINUTES.encode(time.minutes),
        HOURS.encode(time.hours),
        DAY.encode(date.day),
        MONTH.encode(date.month),
        YEAR.encode(date.year),
    ]
}

/// Decode raw register bytes, in [`REGISTERS`] order.
#[must_use]
pub const fn decode_registers(raw: [u8; 6]) -> (Date, Time) {
    let [seconds, minutes, hours, day, month, year] = raw;
    (
        Date::new(DAY.decode(day), MONTH.decode(month), YEAR.decode(year)),
        Time::new(
            HOURS.decode(hours),
            MINUTES.decode(minutes),
            SECONDS.decode(seconds),
        ),
    )
}

/// A device abstraction for the DS3234 timekeeping registers.
pub struct Ds3234<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Ds3234<SPI> {
    #[must_use]
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Configure the control register once at startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] if the SPI transfer fails.
    pub async fn init(&mut self) -> Result<()> {
        self.spi
            .write(&[CONTROL_WRITE_ADDRESS, CONTROL_VALUE])
            .await
            .map_err(|_| Error::RtcBus)?;
        info!("RTC: control register set to {=u8:#x}", CONTROL_VALUE);
        Ok(())
    }

    /// Read the current date and time, one register per transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] if any SPI transfer fails.
    pub async fn read_date_time(&mut self) -> Result<(Date, Time)> {
        let mut raw = [0u8; REGISTERS.len()];
        for (register, slot) in REGISTERS.iter().zip(raw.iter_mut()) {
            let mut value = [0u8; 1];
            self.spi
                .transaction(&mut [
                    Operation::Write(&[register.address]),
                    Operation::Read(&mut value),
                ])
                .await
                .map_err(|_| Error::RtcBus)?;
            let [byte] = value;
            *slot = byte;
        }
        Ok(decode_registers(raw))
    }

    /// Write a date and time, one register per transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] if any SPI transfer fails.
    pub async fn write_date_time(&mut self, date: Date, time: Time) -> Result<()> {
        let raw = encode_registers(date, time);
        for (register, byte) in REGISTERS.iter().zip(raw) {
            self.spi
                .write(&[register.address | WRITE_FLAG, byte])
                .await
                .map_err(|_| Error::RtcBus)?;
        }
        info!(
            "RTC: wrote {}-{}-{} {}:{}:{}",
            date.day, date.month, date.year, time.hours, time.minutes, time.seconds
        );
        Ok(())
    }
}
