//! Decoding the two resistor-ladder button clusters.
//!
//! Each cluster shares one analog line; every button pulls it to a distinct
//! level. A poll averages several conversions and takes the first button whose
//! level is within [`BUTTON_TOLERANCE`] of the average, front cluster first.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

use crate::alarm_store::AlarmId;
use crate::analog::{AnalogInputs, AnalogLine, average};
use crate::shared_constants::pause;
use crate::{
    ALARM1_BUTTON_LEVEL, ALARM2_BUTTON_LEVEL, BUTTON_TOLERANCE, DOWN_BUTTON_LEVEL,
    FRONT_SAMPLE_COUNT, HOLD_POLL_INTERVAL, LONG_PRESS_DURATION, MODE_BUTTON_LEVEL,
    REAR_SAMPLE_COUNT, Result, SET_BUTTON_LEVEL, UP_BUTTON_LEVEL,
};

/// Which button, if any, is down right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    #[default]
    None,
    Alarm1,
    Up,
    Down,
    Alarm2,
    Set,
    Mode,
}

const FRONT_BUTTONS: [(Button, u16); 4] = [
    (Button::Alarm1, ALARM1_BUTTON_LEVEL),
    (Button::Up, UP_BUTTON_LEVEL),
    (Button::Down, DOWN_BUTTON_LEVEL),
    (Button::Alarm2, ALARM2_BUTTON_LEVEL),
];

const REAR_BUTTONS: [(Button, u16); 2] = [
    (Button::Mode, MODE_BUTTON_LEVEL),
    (Button::Set, SET_BUTTON_LEVEL),
];

impl Button {
    /// Match an averaged front-line level.
    #[must_use]
    pub fn from_front_level(level: u16) -> Self {
        Self::match_level(&FRONT_BUTTONS, level)
    }

    /// Match an averaged rear-line level.
    #[must_use]
    pub fn from_rear_level(level: u16) -> Self {
        Self::match_level(&REAR_BUTTONS, level)
    }

    fn match_level(table: &[(Self, u16)], level: u16) -> Self {
        table
            .iter()
            .find(|(_, expected)| level.abs_diff(*expected) <= BUTTON_TOLERANCE)
            .map_or(Self::None, |(button, _)| *button)
    }

    /// The alarm this button selects, for the two alarm buttons.
    #[must_use]
    pub const fn alarm(self) -> Option<AlarmId> {
        match self {
            Self::Alarm1 => Some(AlarmId::One),
            Self::Alarm2 => Some(AlarmId::Two),
            _ => None,
        }
    }

    /// The button that belongs to `id`.
    #[must_use]
    pub const fn for_alarm(id: AlarmId) -> Self {
        match id {
            AlarmId::One => Self::Alarm1,
            AlarmId::Two => Self::Alarm2,
        }
    }
}

/// A device abstraction for both button clusters.
pub struct Buttons<A, D> {
    inputs: A,
    delay: D,
}

impl<A: AnalogInputs, D: DelayNs> Buttons<A, D> {
    #[must_use]
    pub const fn new(inputs: A, delay: D) -> Self {
        Self { inputs, delay }
    }

    /// Sample both lines and return the first matching button.
    ///
    /// # Errors
    ///
    /// Propagates a failed analog conversion.
    pub async fn poll(&mut self) -> Result<Button> {
        let front = average(
            &mut self.inputs,
            &mut self.delay,
            AnalogLine::FrontButtons,
            FRONT_SAMPLE_COUNT,
        )
        .await?;
        let button = Button::from_front_level(front);
        if button != Button::None {
            return Ok(button);
        }
        let rear = average(
            &mut self.inputs,
            &mut self.delay,
            AnalogLine::RearButtons,
            REAR_SAMPLE_COUNT,
        )
        .await?;
        Ok(Button::from_rear_level(rear))
    }

    /// Keep polling while `button` stays down. True once it has been down
    /// longer than [`LONG_PRESS_DURATION`], false if it is released first.
    ///
    /// # Errors
    ///
    /// Propagates a failed analog conversion.
    pub async fn is_held(&mut self, button: Button) -> Result<bool> {
        let mut held_for = Duration::from_ticks(0);
        while self.poll().await? == button {
            pause(&mut self.delay, HOLD_POLL_INTERVAL).await;
            held_for += HOLD_POLL_INTERVAL;
            if held_for > LONG_PRESS_DURATION {
                debug!("Button {} held", button);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Wait until `button` is no longer down.
    ///
    /// # Errors
    ///
    /// Propagates a failed analog conversion.
    pub async fn wait_for_release(&mut self, button: Button) -> Result<()> {
        while self.poll().await? == button {
            pause(&mut self.delay, HOLD_POLL_INTERVAL).await;
        }
        Ok(())
    }

    /// The analog inputs and delay, lent out so the light sensor can share the ADC.
    pub const fn analog_mut(&mut self) -> (&mut A, &mut D) {
        (&mut self.inputs, &mut self.delay)
    }
}
