//! The main control loop and the configuration flows it runs.
//!
//! Each pass of [`Controller::step`] nudges the brightness, polls the buttons,
//! dispatches whatever the current [`ClockMode`] makes of the press, and checks
//! both alarms. A configuration flow takes over the loop until the user
//! finishes it; nothing else on this side runs meanwhile, while the time-update
//! task keeps ticking in its own task.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use crate::alarm::Buzzer;
use crate::alarm_store::{AlarmId, AlarmSettings, AlarmStore, AlarmTime, BlockStorage};
use crate::analog::AnalogInputs;
use crate::brightness::Brightness;
use crate::button::{Button, Buttons};
use crate::clock::ClockContext;
use crate::clock_state::{ButtonAction, ClockMode};
use crate::date_time::{FieldRange, Time, restrict_alarm, restrict_date, restrict_time};
use crate::display::Display;
use crate::editor::{EditField, FieldEditor, run_editor};
use crate::nixie::{BLANK_FIELD, Frame};
use crate::shared_constants::pause;
use crate::time_sync::RtcWriteNotifier;
use crate::{ALARM_PREVIEW_DURATION, Never, Result};

/// The configuration flows that take over the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Flow {
    EditDateTime,
    /// Alarm to set and the button that started the flow.
    SetAlarm(AlarmId, Button),
    EnableAlarm(AlarmId),
}

/// Owns every peripheral the main loop touches.
pub struct Controller<'a, A, D, P, B, S> {
    context: &'a ClockContext,
    display: Display<'a>,
    rtc_writes: &'a RtcWriteNotifier,
    buttons: Buttons<A, D>,
    brightness: Brightness,
    pwm: P,
    buzzer: Buzzer<B>,
    store: AlarmStore<S>,
    alarms: AlarmSettings,
    last_alarm_check: Option<Time>,
}

impl<'a, A, D, P, B, S> Controller<'a, A, D, P, B, S>
where
    A: AnalogInputs,
    D: DelayNs,
    P: SetDutyCycle,
    B: OutputPin,
    S: BlockStorage,
{
    /// Builds the controller and loads the persisted alarms.
    #[expect(clippy::too_many_arguments, reason = "One argument per peripheral")]
    pub fn new(
        context: &'a ClockContext,
        display: Display<'a>,
        rtc_writes: &'a RtcWriteNotifier,
        buttons: Buttons<A, D>,
        pwm: P,
        buzzer: Buzzer<B>,
        mut store: AlarmStore<S>,
    ) -> Self {
        let alarms = store.load();
        Self {
            context,
            display,
            rtc_writes,
            buttons,
            brightness: Brightness::default(),
            pwm,
            buzzer,
            store,
            alarms,
            last_alarm_check: None,
        }
    }

    #[must_use]
    pub const fn alarms(&self) -> &AlarmSettings {
        &self.alarms
    }

    #[must_use]
    pub const fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Run the main loop forever. Errors are logged and the loop carries on.
    pub async fn run(&mut self) -> Never {
        loop {
            if let Err(err) = self.step().await {
                error!("Controller: {}", err);
            }
        }
    }

    /// One pass of the main loop.
    ///
    /// # Errors
    ///
    /// Returns the first peripheral or storage failure of this pass.
    pub async fn step(&mut self) -> Result<()> {
        let (inputs, delay) = self.buttons.analog_mut();
        self.brightness.update(inputs, delay, &mut self.pwm).await?;

        let button = self.buttons.poll().await?;
        if button != Button::None {
            self.handle_press(button).await?;
        }

        self.check_alarms().await
    }

    async fn handle_press(&mut self, button: Button) -> Result<()> {
        let mode = self.context.mode();
        let held = if ClockMode::needs_hold_check(button) {
            self.buttons.is_held(button).await?
        } else {
            false
        };
        match mode.action(button, held) {
            ButtonAction::Ignore => Ok(()),
            ButtonAction::ToggleMode => {
                let next = mode.toggled();
                self.context.set_mode(next);
                info!("Mode: {}", next);
                self.buttons.wait_for_release(button).await
            }
            ButtonAction::EditDateTime => self.run_flow(Flow::EditDateTime).await,
            ButtonAction::SetAlarm(id) => self.run_flow(Flow::SetAlarm(id, button)).await,
            ButtonAction::ToggleAlarm(id) if self.alarms.enabled(id) => self.disable_alarm(id),
            ButtonAction::ToggleAlarm(id) => self.run_flow(Flow::EnableAlarm(id)).await,
        }
    }

    /// Run a configuration flow with the mode forced to `Set`, then restore the
    /// prior mode and redraw the time, whether or not the flow succeeded.
    async fn run_flow(&mut self, flow: Flow) -> Result<()> {
        let prior = self.context.mode();
        self.context.set_mode(ClockMode::Set);
        debug!("Flow {} started", flow);
        let result = match flow {
            Flow::EditDateTime => self.edit_date_time().await,
            Flow::SetAlarm(id, trigger) => self.set_alarm(id, trigger).await,
            Flow::EnableAlarm(id) => self.enable_alarm(id).await,
        };
        self.context.set_mode(prior);
        self.display.show(Frame::new(self.context.time().fields()));
        debug!("Flow {} finished", flow);
        result
    }

    fn alarm_frame(&self, id: AlarmId) -> Frame {
        let AlarmTime { hours, minutes } = self.alarms.time(id);
        Frame::new([hours, minutes, BLANK_FIELD])
    }

    /// Preview the alarm time, then enable and save it.
    async fn enable_alarm(&mut self, id: AlarmId) -> Result<()> {
        self.display.show(self.alarm_frame(id));
        let (_, delay) = self.buttons.analog_mut();
        pause(delay, ALARM_PREVIEW_DURATION).await;
        self.alarms.set_enabled(id, true);
        self.store.save(&self.alarms)?;
        info!("Alarm {} enabled", id);
        Ok(())
    }

    fn disable_alarm(&mut self, id: AlarmId) -> Result<()> {
        self.alarms.set_enabled(id, false);
        self.store.save(&self.alarms)?;
        info!("Alarm {} disabled", id);
        Ok(())
    }

    /// Edit hours then minutes of alarm `id`, then enable and save it.
    async fn set_alarm(&mut self, id: AlarmId, trigger: Button) -> Result<()> {
        self.display.show(self.alarm_frame(id));
        self.buttons.wait_for_release(trigger).await?;

        let current = self.alarms.time(id);
        let mut editor = FieldEditor::new(&[
            EditField::new(current.hours, FieldRange::HOURS),
            EditField::new(current.minutes, FieldRange::MINUTES),
        ]);
        run_editor(&mut editor, &mut self.buttons, &self.display).await?;

        let values = editor.values();
        let edited = restrict_alarm([
            i16::from(values.first().copied().unwrap_or(current.hours)),
            i16::from(values.get(1).copied().unwrap_or(current.minutes)),
        ]);
        self.alarms.set_time(id, edited);
        self.alarms.set_enabled(id, true);
        self.store.save(&self.alarms)?;
        info!("Alarm {} set to {}:{}", id, edited.hours, edited.minutes);
        Ok(())
    }

    /// Edit day, month, year, hours, minutes and seconds with the periodic
    /// sync paused, then hand the result to the time-update task to write.
    async fn edit_date_time(&mut self) -> Result<()> {
        self.context.pause_sync();
        info!("Periodic sync paused");
        let date = self.context.date();
        let time = self.context.time();
        let mut editor = FieldEditor::new(&[
            EditField::new(date.day, FieldRange::DAY),
            EditField::new(date.month, FieldRange::MONTH),
            EditField::new(date.year, FieldRange::YEAR),
            EditField::new(time.hours, FieldRange::HOURS),
            EditField::new(time.minutes, FieldRange::MINUTES),
            EditField::new(time.seconds, FieldRange::SECONDS),
        ]);
        if let Err(err) = run_editor(&mut editor, &mut self.buttons, &self.display).await {
            self.context.resume_sync();
            return Err(err);
        }

        let mut raw = [0i16; 6];
        for (slot, value) in raw.iter_mut().zip(editor.values()) {
            *slot = i16::from(value);
        }
        let [day, month, year, hours, minutes, seconds] = raw;
        let date = restrict_date([day, month, year]);
        let time = restrict_time([hours, minutes, seconds]);
        self.context.set_date_time(date, time);
        // The time-update task writes the RTC and resumes the sync.
        self.rtc_writes.signal((date, time));
        info!(
            "Date/time set to {}-{}-{} {}:{}:{}",
            date.day, date.month, date.year, time.hours, time.minutes, time.seconds
        );
        Ok(())
    }

    /// Ring any alarm whose minute has just begun. Each distinct time is
    /// checked once so the second-0 tick cannot fire twice.
    async fn check_alarms(&mut self) -> Result<()> {
        let now = self.context.time();
        if self.last_alarm_check == Some(now) {
            return Ok(());
        }
        self.last_alarm_check = Some(now);
        for id in AlarmId::ALL {
            if self.alarms.should_fire(id, now) {
                self.buzzer
                    .ring(id, &mut self.alarms, &mut self.store, &mut self.buttons)
                    .await?;
            }
        }
        Ok(())
    }
}
