//! The time-update task.
//!
//! The RTC pulses its square-wave line once a second. On every falling edge the
//! [`TimeKeeper`] remembers the time it last showed, re-reads the RTC, decides
//! whether the cathode-cleaning window has started and, if not, asks the display
//! for whatever the current mode renders.
//!
//! The task also owns the RTC for writing: the date/time editor hands its result
//! over through a [`RtcWriteNotifier`] instead of touching the bus itself.

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiDevice;

use crate::clock::ClockContext;
use crate::date_time::{Date, Time};
use crate::display::Display;
use crate::rtc::Ds3234;
use crate::{Never, Result};

/// Signal carrying a date and time to write to the RTC.
pub type RtcWriteNotifier = Signal<CriticalSectionRawMutex, (Date, Time)>;

/// Creates a notifier for RTC writes.
#[must_use]
pub const fn rtc_write_notifier() -> RtcWriteNotifier {
    Signal::new()
}

/// Keeps [`ClockContext`] in step with the RTC and re-renders each second.
pub struct TimeKeeper<'a, SPI> {
    rtc: Ds3234<SPI>,
    context: &'a ClockContext,
    display: Display<'a>,
    writes: &'a RtcWriteNotifier,
}

impl<'a, SPI: SpiDevice> TimeKeeper<'a, SPI> {
    #[must_use]
    pub const fn new(
        rtc: Ds3234<SPI>,
        context: &'a ClockContext,
        display: Display<'a>,
        writes: &'a RtcWriteNotifier,
    ) -> Self {
        Self {
            rtc,
            context,
            display,
            writes,
        }
    }

    /// Configure the RTC, take the first reading and draw it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`](crate::Error::RtcBus) if the RTC cannot be reached.
    pub async fn init(&mut self) -> Result<()> {
        self.rtc.init().await?;
        let (date, time) = self.rtc.read_date_time().await?;
        self.context.sync(date, time);
        self.context.sync(date, time);
        info!(
            "Time at boot: {}-{}-{} {}:{}:{}",
            date.day, date.month, date.year, time.hours, time.minutes, time.seconds
        );
        self.render(date, time);
        Ok(())
    }

    /// Handle one periodic trigger. Does nothing while sync is paused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`](crate::Error::RtcBus) if the RTC read fails;
    /// the shared time is then left as it was.
    pub async fn on_tick(&mut self) -> Result<()> {
        if self.context.sync_paused() {
            return Ok(());
        }
        let (date, time) = self.rtc.read_date_time().await?;
        self.context.sync(date, time);
        self.render(date, time);
        Ok(())
    }

    fn render(&self, date: Date, time: Time) {
        let mode = self.context.mode();
        let cleaning = mode.is_cleaning_window(time);
        let was_cleaning = self.context.set_cleaning(cleaning);
        if cleaning {
            if !was_cleaning {
                info!("Cathode cleaning started");
                self.display.clean();
            }
            return;
        }
        if was_cleaning {
            info!("Cathode cleaning finished");
        }
        if let Some(command) = mode.render(self.context.previous_time(), time, date) {
            self.display.send(command);
        }
    }

    /// Write an edited date and time to the RTC, publish it, and let the
    /// periodic sync run again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`](crate::Error::RtcBus) if the write fails. Sync
    /// is resumed either way.
    pub async fn commit(&mut self, date: Date, time: Time) -> Result<()> {
        let result = self.rtc.write_date_time(date, time).await;
        if result.is_ok() {
            self.context.set_date_time(date, time);
        }
        self.context.resume_sync();
        info!("Periodic sync resumed");
        result
    }

    /// Serve periodic triggers and RTC writes forever.
    pub async fn run<W: Wait>(&mut self, trigger: &mut W) -> Never {
        loop {
            match select(trigger.wait_for_falling_edge(), self.writes.wait()).await {
                Either::First(Ok(())) => {
                    if let Err(err) = self.on_tick().await {
                        error!("Time update failed: {}", err);
                    }
                }
                Either::First(Err(_)) => {
                    error!("Periodic trigger input failed");
                }
                Either::Second((date, time)) => {
                    if let Err(err) = self.commit(date, time).await {
                        error!("RTC write failed: {}", err);
                    }
                }
            }
        }
    }
}
