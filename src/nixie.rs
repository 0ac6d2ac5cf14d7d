//! Bit-banged driver for six nixie tubes behind a chain of high-voltage shift
//! registers.
//!
//! Each tube takes a 10-bit frame with every cathode line high except the one
//! for the lit digit; an all-high frame blanks the tube. Frames are clocked in
//! MSB first, one clock pulse per bit, and a strobe pulse latches all six at once.
//! A separate output drives the decimal point.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embassy_time::Duration;
use oorandom::Rand32;

use crate::{Error, FADE_STEPS, Result};

/// Bits per tube frame.
pub const FRAME_BITS: u32 = 10;

/// All cathodes off.
pub const BLANK_PATTERN: u16 = 0x03FF;

/// Field value that renders as two blank tubes.
pub const BLANK_FIELD: u8 = u8::MAX;

/// Cathode pattern for each digit: all ten lines high except the lit one.
pub const DIGIT_PATTERNS: [u16; 10] = [
    0x03FE, 0x03FD, 0x03FB, 0x03F7, 0x03EF, 0x03DF, 0x03BF, 0x037F, 0x02FF, 0x01FF,
];

/// What the six tubes and the decimal point should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Three two-digit fields, left to right. Anything above 99 is blank.
    pub fields: [u8; 3],
    pub decimal_point: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Frame {
    pub const BLANK: Self = Self::new([BLANK_FIELD; 3]);

    #[must_use]
    pub const fn new(fields: [u8; 3]) -> Self {
        Self {
            fields,
            decimal_point: false,
        }
    }

    #[must_use]
    pub const fn with_decimal_point(mut self, on: bool) -> Self {
        self.decimal_point = on;
        self
    }

    /// The same frame with one field blanked, for edit blinking.
    #[must_use]
    pub fn with_blank_field(mut self, index: usize) -> Self {
        if let Some(field) = self.fields.get_mut(index) {
            *field = BLANK_FIELD;
        }
        self
    }

    /// Three random two-digit fields for cathode cleaning.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rand_range(0..100) is below 100"
    )]
    pub fn random(rng: &mut Rand32) -> Self {
        Self::new([
            rng.rand_range(0..100) as u8,
            rng.rand_range(0..100) as u8,
            rng.rand_range(0..100) as u8,
        ])
    }

    /// Tube patterns in shift order: field 2 first, ones digit before tens digit.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Divisor is the constant 10"
    )]
    pub fn patterns(&self) -> [u16; 6] {
        let mut patterns = [BLANK_PATTERN; 6];
        for (pair, field) in patterns.chunks_exact_mut(2).zip(self.fields.iter().rev()) {
            if let [ones, tens] = pair {
                if *field <= 99 {
                    *ones = digit_pattern(field % 10);
                    *tens = digit_pattern(field / 10);
                }
            }
        }
        patterns
    }
}

fn digit_pattern(digit: u8) -> u16 {
    DIGIT_PATTERNS
        .get(usize::from(digit))
        .copied()
        .unwrap_or(BLANK_PATTERN)
}

/// The four output lines of the tube driver.
pub struct NixieTubes<P> {
    data: P,
    clock: P,
    strobe: P,
    decimal_point: P,
}

impl<P: OutputPin> NixieTubes<P> {
    #[must_use]
    pub const fn new(data: P, clock: P, strobe: P, decimal_point: P) -> Self {
        Self {
            data,
            clock,
            strobe,
            decimal_point,
        }
    }

    /// Shift out all six tubes, latch them and set the decimal point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisplayPin`] if any output cannot be set.
    pub fn show(&mut self, frame: &Frame) -> Result<()> {
        for pattern in frame.patterns() {
            self.shift_pattern(pattern)?;
        }
        self.strobe.set_high().map_err(|_| Error::DisplayPin)?;
        self.strobe.set_low().map_err(|_| Error::DisplayPin)?;
        self.set_decimal_point(frame.decimal_point)
    }

    /// # Errors
    ///
    /// Returns [`Error::DisplayPin`] if the output cannot be set.
    pub fn set_decimal_point(&mut self, on: bool) -> Result<()> {
        self.decimal_point
            .set_state(on.into())
            .map_err(|_| Error::DisplayPin)
    }

    fn shift_pattern(&mut self, pattern: u16) -> Result<()> {
        for bit in (0..FRAME_BITS).rev() {
            let high = (pattern >> bit) & 1 == 1;
            self.data
                .set_state(high.into())
                .map_err(|_| Error::DisplayPin)?;
            self.clock.set_high().map_err(|_| Error::DisplayPin)?;
            self.clock.set_low().map_err(|_| Error::DisplayPin)?;
        }
        Ok(())
    }

    /// Dissolve from `source` to `target` over roughly `duration`.
    ///
    /// Each of [`FADE_STEPS`] equal slots shows `source` then `target`; the
    /// source share shrinks every step while the target share grows, and the
    /// shares of a slot always add up to the whole slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisplayPin`] if any output cannot be set.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "step < FADE_STEPS, so shares stay within one slot"
    )]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Fade durations are a few hundred milliseconds"
    )]
    pub async fn fade<D: DelayNs>(
        &mut self,
        target: &Frame,
        source: &Frame,
        duration: Duration,
        delay: &mut D,
    ) -> Result<()> {
        let slot_us = duration.as_micros() as u32 / FADE_STEPS;
        for step in 0..FADE_STEPS {
            let source_us = slot_us * (FADE_STEPS - step) / FADE_STEPS;
            let target_us = slot_us - source_us;
            self.show(source)?;
            delay.delay_us(source_us).await;
            self.show(target)?;
            delay.delay_us(target_us).await;
        }
        Ok(())
    }
}
