//! The field editor shared by the alarm-set and date/time-edit flows.
//!
//! Up and down nudge the active field by one, wrapping at the ends of its
//! range. Either alarm button moves to the next field; moving past the last
//! field finishes the edit. The active field blinks at 1 Hz.
//!
//! [`FieldEditor`] is a plain state machine; [`run_editor`] drives it from
//! the buttons and shows every step on the display.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::analog::AnalogInputs;
use crate::button::{Button, Buttons};
use crate::date_time::FieldRange;
use crate::display::Display;
use crate::nixie::{BLANK_FIELD, Frame};
use crate::shared_constants::pause;
use crate::{
    BLINK_HALF_PERIOD, EDIT_POLL_INTERVAL, EDIT_REPEAT_DELAY, FIELD_ADVANCE_DEBOUNCE, Result,
};

/// Most fields any flow edits (day, month, year, hours, minutes, seconds).
pub const MAX_FIELDS: usize = 6;

/// Fields shown on the tubes at once.
const FIELDS_PER_PAGE: usize = 3;

/// One editable value and its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditField {
    pub value: u8,
    pub range: FieldRange,
}

impl EditField {
    #[must_use]
    pub const fn new(value: u8, range: FieldRange) -> Self {
        Self { value, range }
    }
}

/// Result of feeding one button to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditStep {
    /// Nothing relevant was pressed.
    Idle,
    /// The active field changed by one.
    Nudged,
    /// The next field is now active.
    Advanced,
    /// The last field was passed; the values are final.
    Done,
}

/// Blink/nudge/advance state machine over up to [`MAX_FIELDS`] fields.
#[derive(Debug, Clone)]
pub struct FieldEditor {
    fields: Vec<EditField, MAX_FIELDS>,
    active: usize,
    elapsed: Duration,
}

impl FieldEditor {
    /// An editor over `fields`, first field active. Extra fields beyond
    /// [`MAX_FIELDS`] are dropped.
    #[must_use]
    pub fn new(fields: &[EditField]) -> Self {
        let mut stored = Vec::new();
        for field in fields.iter().take(MAX_FIELDS) {
            // Capacity is guaranteed by the take above.
            let _ = stored.push(*field);
        }
        Self {
            fields: stored,
            active: 0,
            elapsed: Duration::from_ticks(0),
        }
    }

    #[must_use]
    pub const fn active(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.active >= self.fields.len()
    }

    /// Current value of every field, in order.
    #[must_use]
    pub fn values(&self) -> Vec<u8, MAX_FIELDS> {
        self.fields.iter().map(|field| field.value).collect()
    }

    /// Apply one polled button.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "u8 widened to i16 before +/- 1; active only grows to len"
    )]
    pub fn press(&mut self, button: Button) -> EditStep {
        let Some(field) = self.fields.get_mut(self.active) else {
            return EditStep::Done;
        };
        match button {
            Button::Up | Button::Down => {
                let delta: i16 = if button == Button::Up { 1 } else { -1 };
                field.value = field.range.wrap(i16::from(field.value) + delta);
                // Keep the field lit while it is being changed.
                self.elapsed = Duration::from_ticks(0);
                EditStep::Nudged
            }
            Button::Alarm1 | Button::Alarm2 => {
                self.active += 1;
                self.elapsed = Duration::from_ticks(0);
                if self.is_done() {
                    EditStep::Done
                } else {
                    EditStep::Advanced
                }
            }
            Button::Set | Button::Mode | Button::None => EditStep::Idle,
        }
    }

    /// Let `duration` pass for blinking purposes.
    #[expect(clippy::arithmetic_side_effects, reason = "Wrapped to one blink period")]
    pub fn tick(&mut self, duration: Duration) {
        let period = BLINK_HALF_PERIOD + BLINK_HALF_PERIOD;
        let ticks = (self.elapsed + duration).as_ticks() % period.as_ticks().max(1);
        self.elapsed = Duration::from_ticks(ticks);
    }

    /// Whether the active field is in the lit half of its blink.
    #[must_use]
    pub fn blink_on(&self) -> bool {
        self.elapsed < BLINK_HALF_PERIOD
    }

    /// The page holding the active field, with that field blanked during the
    /// dark half of the blink. Short pages are padded with blank tubes.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        reason = "Divisor is a non-zero constant"
    )]
    pub fn frame(&self) -> Frame {
        let active = self.active.min(self.fields.len().saturating_sub(1));
        let page = active / FIELDS_PER_PAGE;
        let mut fields = [BLANK_FIELD; FIELDS_PER_PAGE];
        for (slot, field) in fields
            .iter_mut()
            .zip(self.fields.iter().skip(page * FIELDS_PER_PAGE))
        {
            *slot = field.value;
        }
        let frame = Frame::new(fields);
        if self.blink_on() {
            frame
        } else {
            frame.with_blank_field(active % FIELDS_PER_PAGE)
        }
    }
}

/// Run `editor` to completion against the buttons, drawing on `display`.
///
/// Blocks the caller until the last field is advanced past.
///
/// # Errors
///
/// Propagates a failed button poll.
pub async fn run_editor<A, D>(
    editor: &mut FieldEditor,
    buttons: &mut Buttons<A, D>,
    display: &Display<'_>,
) -> Result<()>
where
    A: AnalogInputs,
    D: DelayNs,
{
    loop {
        display.show(editor.frame());
        let button = buttons.poll().await?;
        let wait = match editor.press(button) {
            EditStep::Idle => EDIT_POLL_INTERVAL,
            EditStep::Nudged => {
                display.show(editor.frame());
                EDIT_REPEAT_DELAY
            }
            EditStep::Advanced => {
                buttons.wait_for_release(button).await?;
                FIELD_ADVANCE_DEBOUNCE
            }
            EditStep::Done => {
                buttons.wait_for_release(button).await?;
                return Ok(());
            }
        };
        let (_, delay) = buttons.analog_mut();
        pause(delay, wait).await;
        editor.tick(wait);
    }
}
