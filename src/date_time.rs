//! Time-of-day and calendar values plus the wrap-around field clamping used by
//! every editor and by the alarm loader.
//!
//! Clamping here is not saturation: a value above a field's range restarts at
//! the minimum and a value below it restarts at the maximum, so holding "up"
//! on the hours field walks 22, 23, 0, 1 ...

/// Wall-clock time in 24-hour form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// 0-23
    pub hours: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-59
    pub seconds: u8,
}

/// Calendar date with a two-digit year. Day is not checked against month length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    /// 1-31
    pub day: u8,
    /// 1-12
    pub month: u8,
    /// 0-99
    pub year: u8,
}

impl Default for Date {
    fn default() -> Self {
        Self {
            day: 1,
            month: 1,
            year: 0,
        }
    }
}

/// Inclusive range of one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldRange {
    pub min: u8,
    pub max: u8,
}

impl FieldRange {
    pub const HOURS: Self = Self { min: 0, max: 23 };
    pub const MINUTES: Self = Self { min: 0, max: 59 };
    pub const SECONDS: Self = Self { min: 0, max: 59 };
    pub const DAY: Self = Self { min: 1, max: 31 };
    pub const MONTH: Self = Self { min: 1, max: 12 };
    pub const YEAR: Self = Self { min: 0, max: 99 };

    /// Wrap `value` into range: above max restarts at min, below min restarts at max.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "In-range values fit in u8 by construction"
    )]
    pub const fn wrap(self, value: i16) -> u8 {
        if value > self.max as i16 {
            self.min
        } else if value < self.min as i16 {
            self.max
        } else {
            value as u8
        }
    }
}

/// Wrap raw `[hours, minutes, seconds]` into a valid [`Time`].
#[must_use]
pub const fn restrict_time(raw: [i16; 3]) -> Time {
    let [hours, minutes, seconds] = raw;
    Time {
        hours: FieldRange::HOURS.wrap(hours),
        minutes: FieldRange::MINUTES.wrap(minutes),
        seconds: FieldRange::SECONDS.wrap(seconds),
    }
}

/// Wrap raw `[day, month, year]` into a valid [`Date`].
#[must_use]
pub const fn restrict_date(raw: [i16; 3]) -> Date {
    let [day, month, year] = raw;
    Date {
        day: FieldRange::DAY.wrap(day),
        month: FieldRange::MONTH.wrap(month),
        year: FieldRange::YEAR.wrap(year),
    }
}

/// Wrap raw `[hours, minutes]` into a valid [`AlarmTime`](crate::AlarmTime).
#[must_use]
pub const fn restrict_alarm(raw: [i16; 2]) -> crate::AlarmTime {
    let [hours, minutes] = raw;
    crate::AlarmTime {
        hours: FieldRange::HOURS.wrap(hours),
        minutes: FieldRange::MINUTES.wrap(minutes),
    }
}

impl Time {
    #[must_use]
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// The three display fields, hours first.
    #[must_use]
    pub const fn fields(self) -> [u8; 3] {
        [self.hours, self.minutes, self.seconds]
    }

    /// Pack into one word so the value can live in a single atomic.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        u32::from_le_bytes([self.hours, self.minutes, self.seconds, 0])
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        let [hours, minutes, seconds, _] = bits.to_le_bytes();
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

impl Date {
    #[must_use]
    pub const fn new(day: u8, month: u8, year: u8) -> Self {
        Self { day, month, year }
    }

    /// The three display fields, day first.
    #[must_use]
    pub const fn fields(self) -> [u8; 3] {
        [self.day, self.month, self.year]
    }

    #[must_use]
    pub const fn to_bits(self) -> u32 {
        u32::from_le_bytes([self.day, self.month, self.year, 0])
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        let [day, month, year, _] = bits.to_le_bytes();
        Self { day, month, year }
    }
}
