//! State shared between the time-update task and the main loop.
//!
//! Every field is a single atomic word, so either side may read or write at
//! any moment without tearing. Multi-step edits of the time itself are
//! bracketed by [`ClockContext::pause_sync`] and [`ClockContext::resume_sync`],
//! during which the time-update task leaves the time alone.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::clock_state::ClockMode;
use crate::date_time::{Date, Time};

/// Process-wide clock state. Create one in a `static` and pass references around.
pub struct ClockContext {
    time: AtomicU32,
    previous_time: AtomicU32,
    date: AtomicU32,
    mode: AtomicU8,
    cleaning: AtomicBool,
    sync_paused: AtomicBool,
}

impl Default for ClockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time: AtomicU32::new(Time::new(0, 0, 0).to_bits()),
            previous_time: AtomicU32::new(Time::new(0, 0, 0).to_bits()),
            date: AtomicU32::new(Date::new(1, 1, 0).to_bits()),
            mode: AtomicU8::new(ClockMode::DisplayTime as u8),
            cleaning: AtomicBool::new(false),
            sync_paused: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn time(&self) -> Time {
        Time::from_bits(self.time.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn previous_time(&self) -> Time {
        Time::from_bits(self.previous_time.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn date(&self) -> Date {
        Date::from_bits(self.date.load(Ordering::Acquire))
    }

    /// Record a fresh reading. The time it replaces becomes the previous time.
    pub fn sync(&self, date: Date, time: Time) {
        let previous = self.time.swap(time.to_bits(), Ordering::AcqRel);
        self.previous_time.store(previous, Ordering::Release);
        self.date.store(date.to_bits(), Ordering::Release);
    }

    /// Overwrite date and time after an edit, without touching the previous time.
    pub fn set_date_time(&self, date: Date, time: Time) {
        self.time.store(time.to_bits(), Ordering::Release);
        self.date.store(date.to_bits(), Ordering::Release);
    }

    #[must_use]
    pub fn mode(&self) -> ClockMode {
        ClockMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn set_mode(&self, mode: ClockMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    #[must_use]
    pub fn cleaning(&self) -> bool {
        self.cleaning.load(Ordering::Acquire)
    }

    /// Store the cleaning flag; returns the value it replaced.
    pub fn set_cleaning(&self, cleaning: bool) -> bool {
        self.cleaning.swap(cleaning, Ordering::AcqRel)
    }

    #[must_use]
    pub fn sync_paused(&self) -> bool {
        self.sync_paused.load(Ordering::Acquire)
    }

    /// Stop the time-update task from reading the RTC or rendering.
    pub fn pause_sync(&self) {
        self.sync_paused.store(true, Ordering::Release);
    }

    pub fn resume_sync(&self) {
        self.sync_paused.store(false, Ordering::Release);
    }
}
