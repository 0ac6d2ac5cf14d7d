//! Control core for a six-tube nixie clock with two alarms.
//!
//! The library is hardware-agnostic: every peripheral is reached through an
//! `embedded-hal` or `embedded-hal-async` trait (or one of the small traits in
//! [`analog`] and [`alarm_store`]), so the same code drives the RP2040 firmware
//! in `main.rs` and the host tests in `tests/`.
#![no_std]

// Must come first so the logging macros are visible to every other module.
#[macro_use]
mod fmt;

pub mod alarm;
pub mod alarm_store;
pub mod analog;
pub mod brightness;
pub mod button;
pub mod clock;
pub mod clock_state;
pub mod controller;
pub mod date_time;
pub mod display;
pub mod editor;
mod error;
#[cfg(feature = "pico1")]
pub mod hardware;
mod never;
pub mod nixie;
pub mod rtc;
mod shared_constants;
pub mod time_sync;

// Re-export commonly used items
pub use alarm::Buzzer;
pub use alarm_store::{AlarmId, AlarmSettings, AlarmStore, AlarmTime, BlockStorage};
pub use analog::{AnalogInputs, AnalogLine};
pub use brightness::Brightness;
pub use button::{Button, Buttons};
pub use clock::ClockContext;
pub use clock_state::ClockMode;
pub use controller::Controller;
pub use date_time::{Date, Time, restrict_alarm, restrict_date, restrict_time};
pub use display::{Display, DisplayCommand, DisplayNotifier};
pub use error::{Error, Result};
pub use never::Never;
pub use nixie::{Frame, NixieTubes};
pub use rtc::Ds3234;
pub use shared_constants::*;
pub use time_sync::{RtcWriteNotifier, TimeKeeper, rtc_write_notifier};
