//! Ambient-light brightness control for the tube supply.
//!
//! The light sensor maps linearly onto 50-100 percent. The stored percentage
//! moves at most one point per update so a hand passing over the sensor does
//! not make the tubes flicker. Tube brightness responds roughly exponentially to
//! duty, so the percentage is turned into duty with `2^(p / R) - 1` where
//! `R = 100 * log10(2) / log10(255)`; that spans duty 0 at 0 percent to 254 at
//! 100 percent.

use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use crate::analog::{AnalogInputs, AnalogLine, average};
use crate::{
    Error, LIGHT_BRIGHT_LEVEL, LIGHT_DARK_LEVEL, LIGHT_SAMPLE_COUNT, MAX_BRIGHTNESS_PERCENT,
    MAX_PWM_DUTY, MIN_BRIGHTNESS_PERCENT, Result,
};

/// Rate-limited brightness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness {
    percent: u8,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new(MAX_BRIGHTNESS_PERCENT)
    }
}

impl Brightness {
    #[must_use]
    pub const fn new(percent: u8) -> Self {
        Self { percent }
    }

    #[must_use]
    pub const fn percent(self) -> u8 {
        self.percent
    }

    /// Percentage the sensor level asks for, before rate limiting.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "i32 holds every 10-bit level times 50; divisor is a non-zero constant"
    )]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Clamped to 50..=100 before the cast"
    )]
    pub fn target_percent(level: u16) -> u8 {
        let min = i32::from(MIN_BRIGHTNESS_PERCENT);
        let max = i32::from(MAX_BRIGHTNESS_PERCENT);
        let dark = i32::from(LIGHT_DARK_LEVEL);
        let bright = i32::from(LIGHT_BRIGHT_LEVEL);
        let mapped = (i32::from(level) - dark) * (max - min) / (bright - dark) + min;
        mapped.clamp(min, max) as u8
    }

    /// Move one point toward the level's target and return the new percentage.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Only stepped toward a target in 50..=100"
    )]
    pub fn step(&mut self, level: u16) -> u8 {
        let target = Self::target_percent(level);
        if target > self.percent {
            self.percent += 1;
        } else if target < self.percent {
            self.percent -= 1;
        }
        self.percent
    }

    /// PWM duty (0-255) for a percentage.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Clamped to 0..=255 before the cast"
    )]
    pub fn duty(percent: u8) -> u8 {
        let ratio = 100.0 * libm::log10f(2.0) / libm::log10f(f32::from(MAX_PWM_DUTY));
        let duty = libm::powf(2.0, f32::from(percent) / ratio) - 1.0;
        libm::roundf(duty).clamp(0.0, f32::from(MAX_PWM_DUTY)) as u8
    }

    /// Sample the light sensor, step toward its target and drive the PWM output.
    ///
    /// # Errors
    ///
    /// Propagates a failed conversion; returns [`Error::Pwm`] if the duty cannot be set.
    pub async fn update<A, D, P>(&mut self, inputs: &mut A, delay: &mut D, pwm: &mut P) -> Result<u8>
    where
        A: AnalogInputs,
        D: DelayNs,
        P: SetDutyCycle,
    {
        let level = average(inputs, delay, AnalogLine::LightSensor, LIGHT_SAMPLE_COUNT).await?;
        let previous = self.percent;
        let percent = self.step(level);
        let duty = Self::duty(percent);
        pwm.set_duty_cycle_fraction(u16::from(duty), u16::from(MAX_PWM_DUTY))
            .map_err(|_| Error::Pwm)?;
        if percent != previous {
            trace!("Brightness {} -> {} (duty {})", previous, percent, duty);
        }
        Ok(duty)
    }
}
