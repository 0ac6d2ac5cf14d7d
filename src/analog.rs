//! The analog lines the clock samples, behind one trait so the RP2040 ADC and
//! host test doubles are interchangeable.

use embedded_hal_async::delay::DelayNs;

use crate::shared_constants::pause;
use crate::{ANALOG_SAMPLE_DELAY, Result};

/// Physical analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogLine {
    /// Resistor ladder under alarm 1, up, down and alarm 2.
    FrontButtons,
    /// Resistor ladder under mode and set.
    RearButtons,
    /// Ambient light sensor.
    LightSensor,
}

/// Reads one conversion from an analog line, scaled to 10 bits (0-1023).
#[expect(async_fn_in_trait, reason = "Single-threaded executor; futures need not be Send")]
pub trait AnalogInputs {
    /// # Errors
    ///
    /// Returns [`Error::AnalogRead`](crate::Error::AnalogRead) if the conversion fails.
    async fn read(&mut self, line: AnalogLine) -> Result<u16>;
}

/// Average `count` conversions of `line`, pausing briefly between them.
///
/// # Errors
///
/// Propagates the first failed conversion.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "At most 25 samples of 10 bits; count is checked non-zero"
)]
#[expect(
    clippy::cast_possible_truncation,
    reason = "Mean of u16 samples fits in u16"
)]
pub async fn average<A: AnalogInputs, D: DelayNs>(
    inputs: &mut A,
    delay: &mut D,
    line: AnalogLine,
    count: u16,
) -> Result<u16> {
    let count = count.max(1);
    let mut sum: u32 = 0;
    for _ in 0..count {
        sum += u32::from(inputs.read(line).await?);
        pause(delay, ANALOG_SAMPLE_DELAY).await;
    }
    Ok((sum / u32::from(count)) as u16)
}
