//! The buzzer and the alarm ring loop.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::alarm_store::{AlarmId, AlarmSettings, AlarmStore, BlockStorage};
use crate::analog::AnalogInputs;
use crate::button::{Button, Buttons};
use crate::shared_constants::pause;
use crate::{ALARM_SILENCED_PAUSE, BUZZER_HALF_PERIOD, Error, Result};

/// A piezo buzzer on one digital output.
pub struct Buzzer<P> {
    pin: P,
}

impl<P: OutputPin> Buzzer<P> {
    #[must_use]
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    /// # Errors
    ///
    /// Returns [`Error::BuzzerPin`] if the output cannot be driven.
    pub fn set(&mut self, on: bool) -> Result<()> {
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| Error::BuzzerPin)
    }

    /// Sound the alarm `id` until it is disabled.
    ///
    /// Each cycle holds the buzzer on then off for [`BUZZER_HALF_PERIOD`] and polls
    /// the buttons. The alarm's own button disables it and the change is saved at
    /// once. Blocks the caller for the whole time; there is no timeout.
    ///
    /// # Errors
    ///
    /// Propagates buzzer, button or storage failures. The buzzer is left off.
    pub async fn ring<A, D, S>(
        &mut self,
        id: AlarmId,
        settings: &mut AlarmSettings,
        store: &mut AlarmStore<S>,
        buttons: &mut Buttons<A, D>,
    ) -> Result<()>
    where
        A: AnalogInputs,
        D: DelayNs,
        S: BlockStorage,
    {
        info!("Alarm {} ringing", id);
        let result = self.ring_until_disabled(id, settings, store, buttons).await;
        self.set(false)?;
        let (_, delay) = buttons.analog_mut();
        pause(delay, ALARM_SILENCED_PAUSE).await;
        result
    }

    async fn ring_until_disabled<A, D, S>(
        &mut self,
        id: AlarmId,
        settings: &mut AlarmSettings,
        store: &mut AlarmStore<S>,
        buttons: &mut Buttons<A, D>,
    ) -> Result<()>
    where
        A: AnalogInputs,
        D: DelayNs,
        S: BlockStorage,
    {
        let off_button = Button::for_alarm(id);
        while settings.enabled(id) {
            for on in [true, false] {
                self.set(on)?;
                let (_, delay) = buttons.analog_mut();
                pause(delay, BUZZER_HALF_PERIOD).await;
            }
            if buttons.poll().await? == off_button {
                settings.set_enabled(id, false);
                store.save(settings)?;
                info!("Alarm {} disabled", id);
                buttons.wait_for_release(off_button).await?;
            }
        }
        Ok(())
    }
}
