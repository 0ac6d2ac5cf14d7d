//! Display modes, what each one renders on a sync tick, and how button presses
//! are dispatched outside configuration flows.

use crate::alarm_store::AlarmId;
use crate::button::Button;
use crate::date_time::{Date, Time};
use crate::display::DisplayCommand;
use crate::nixie::Frame;
use crate::{CLEANING_PERIOD_MINUTES, CLEANING_WINDOW_SECONDS, FADE_DURATION, SWITCH_INTERVAL_SECONDS};

/// Represents the modes the clock can be in.
///
/// `Set` is entered by every configuration flow and replaced by the prior mode
/// when the flow ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ClockMode {
    #[default]
    DisplayTime = 0,
    DisplayDateTime = 1,
    Set = 2,
}

/// What the main loop should do about a button seen outside a configuration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    Ignore,
    ToggleMode,
    EditDateTime,
    SetAlarm(AlarmId),
    ToggleAlarm(AlarmId),
}

impl ClockMode {
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::DisplayDateTime,
            2 => Self::Set,
            _ => Self::DisplayTime,
        }
    }

    /// The mode after a press of the mode button. `Set` ignores it.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::DisplayTime => Self::DisplayDateTime,
            Self::DisplayDateTime => Self::DisplayTime,
            Self::Set => Self::Set,
        }
    }

    /// Whether this tick falls in the cathode-cleaning window: the first three
    /// seconds of every twentieth minute, never while configuring.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        reason = "Divisor is a non-zero constant"
    )]
    pub const fn is_cleaning_window(self, time: Time) -> bool {
        !matches!(self, Self::Set)
            && time.minutes % CLEANING_PERIOD_MINUTES == 0
            && time.seconds < CLEANING_WINDOW_SECONDS
    }

    /// What the display should do for this sync tick. `Set` leaves the
    /// display to the running configuration flow.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        reason = "Divisors are non-zero constants"
    )]
    pub fn render(self, previous: Time, time: Time, date: Date) -> Option<DisplayCommand> {
        let fade = DisplayCommand::Fade {
            target: Frame::new(time.fields()),
            source: Frame::new(previous.fields()),
            duration: FADE_DURATION,
        };
        match self {
            Self::DisplayTime => Some(fade),
            Self::DisplayDateTime => {
                let phase = time.seconds / SWITCH_INTERVAL_SECONDS;
                let date_phase = phase % 2 == 1;
                let at_boundary = time.seconds % SWITCH_INTERVAL_SECONDS == 0;
                Some(if date_phase {
                    DisplayCommand::Show(
                        Frame::new(date.fields()).with_decimal_point(time.seconds % 2 == 0),
                    )
                } else if at_boundary {
                    DisplayCommand::Show(Frame::new(time.fields()))
                } else {
                    fade
                })
            }
            Self::Set => None,
        }
    }

    /// Map a press (and whether it turned into a hold) to an action.
    #[must_use]
    pub const fn action(self, button: Button, held: bool) -> ButtonAction {
        if matches!(self, Self::Set) {
            return ButtonAction::Ignore;
        }
        match button {
            Button::Mode => ButtonAction::ToggleMode,
            Button::Set if held => ButtonAction::EditDateTime,
            Button::Alarm1 | Button::Alarm2 => {
                let id = match button {
                    Button::Alarm2 => AlarmId::Two,
                    _ => AlarmId::One,
                };
                if held {
                    ButtonAction::SetAlarm(id)
                } else {
                    ButtonAction::ToggleAlarm(id)
                }
            }
            Button::Set | Button::Up | Button::Down | Button::None => ButtonAction::Ignore,
        }
    }

    /// Whether a press of `button` must be timed to tell a press from a hold.
    #[must_use]
    pub const fn needs_hold_check(button: Button) -> bool {
        matches!(button, Button::Set | Button::Alarm1 | Button::Alarm2)
    }
}
