//! Alarm configuration and its persistence in nonvolatile storage.
//!
//! The stored block is exactly six bytes in field order:
//!
//! | byte | field            |
//! |------|------------------|
//! | 0    | alarm 1 enabled  |
//! | 1    | alarm 2 enabled  |
//! | 2, 3 | alarm 1 hh, mm   |
//! | 4, 5 | alarm 2 hh, mm   |
//!
//! `postcard` produces this layout directly from the `serde` derive: `bool` and
//! `u8` are one byte each and structs carry no length or padding. There is no
//! magic number, version or checksum. Bytes that do not decode (erased flash
//! reads as `0xFF`) yield disabled alarms at 00:00, and every load passes both
//! times through [`restrict_alarm`] so out-of-range values wrap back into range.

use serde::{Deserialize, Serialize};

use crate::date_time::{Time, restrict_alarm};
use crate::{ALARM_STORE_OFFSET, Error, Result};

/// Size of the persisted block in bytes.
pub const ALARM_BLOCK_LEN: usize = 6;

/// Byte-addressed nonvolatile storage.
pub trait BlockStorage {
    /// Fill `bytes` from storage starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium cannot be read.
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<()>;

    /// Replace storage at `offset` with `bytes`, erasing first if the medium needs it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium cannot be erased or written.
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()>;
}

/// Selects one of the two alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmId {
    One,
    Two,
}

impl AlarmId {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];
}

/// Hour and minute of one alarm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    pub hours: u8,
    pub minutes: u8,
}

impl AlarmTime {
    #[must_use]
    pub const fn new(hours: u8, minutes: u8) -> Self {
        Self { hours, minutes }
    }

    /// True when `time` is this alarm's minute and its first second.
    #[must_use]
    pub const fn matches(self, time: Time) -> bool {
        time.hours == self.hours && time.minutes == self.minutes && time.seconds == 0
    }

    #[must_use]
    const fn restricted(self) -> Self {
        restrict_alarm([self.hours as i16, self.minutes as i16])
    }
}

/// Both alarms' enable flags and set-points. Field order is the storage order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSettings {
    pub alarm1_enabled: bool,
    pub alarm2_enabled: bool,
    pub alarm1_time: AlarmTime,
    pub alarm2_time: AlarmTime,
}

impl AlarmSettings {
    #[must_use]
    pub const fn enabled(&self, id: AlarmId) -> bool {
        match id {
            AlarmId::One => self.alarm1_enabled,
            AlarmId::Two => self.alarm2_enabled,
        }
    }

    pub const fn set_enabled(&mut self, id: AlarmId, enabled: bool) {
        match id {
            AlarmId::One => self.alarm1_enabled = enabled,
            AlarmId::Two => self.alarm2_enabled = enabled,
        }
    }

    #[must_use]
    pub const fn time(&self, id: AlarmId) -> AlarmTime {
        match id {
            AlarmId::One => self.alarm1_time,
            AlarmId::Two => self.alarm2_time,
        }
    }

    pub const fn set_time(&mut self, id: AlarmId, time: AlarmTime) {
        match id {
            AlarmId::One => self.alarm1_time = time,
            AlarmId::Two => self.alarm2_time = time,
        }
    }

    /// True exactly at second 0 of the alarm's minute, if the alarm is enabled.
    #[must_use]
    pub const fn should_fire(&self, id: AlarmId, now: Time) -> bool {
        self.enabled(id) && self.time(id).matches(now)
    }

    /// Wrap both set-points into valid hour/minute ranges.
    #[must_use]
    pub const fn restricted(mut self) -> Self {
        self.alarm1_time = self.alarm1_time.restricted();
        self.alarm2_time = self.alarm2_time.restricted();
        self
    }
}

/// Loads and saves [`AlarmSettings`] at a fixed storage offset.
pub struct AlarmStore<S> {
    storage: S,
    offset: u32,
}

impl<S: BlockStorage> AlarmStore<S> {
    /// Store at the default offset.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self::with_offset(storage, ALARM_STORE_OFFSET)
    }

    #[must_use]
    pub const fn with_offset(storage: S, offset: u32) -> Self {
        Self { storage, offset }
    }

    /// Load the settings, falling back to disabled alarms at 00:00 if the
    /// block cannot be read or decoded.
    pub fn load(&mut self) -> AlarmSettings {
        let mut buffer = [0u8; ALARM_BLOCK_LEN];
        let settings = match self.storage.read(self.offset, &mut buffer) {
            Ok(()) => postcard::from_bytes::<AlarmSettings>(&buffer).unwrap_or_else(|_| {
                info!("AlarmStore: no valid alarm block, using defaults");
                AlarmSettings::default()
            }),
            Err(err) => {
                error!("AlarmStore: read failed: {}", err);
                AlarmSettings::default()
            }
        }
        .restricted();
        info!("AlarmStore: loaded {}", settings);
        settings
    }

    /// Persist the settings immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if serialization fails, or the storage error.
    pub fn save(&mut self, settings: &AlarmSettings) -> Result<()> {
        let mut buffer = [0u8; ALARM_BLOCK_LEN];
        let bytes = postcard::to_slice(settings, &mut buffer).map_err(|_| Error::FormatError)?;
        self.storage.write(self.offset, bytes)?;
        info!("AlarmStore: saved {}", settings);
        Ok(())
    }

    /// Give back the underlying storage.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.storage
    }
}
