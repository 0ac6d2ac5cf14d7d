//! Host-level tests for the main loop and its configuration flows.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{MemoryStorage, MockDelay, PinLog, RecordingPin, RecordingPwm, ScriptedAnalog};
use embassy_futures::block_on;
use nixie_clock::alarm_store::ALARM_BLOCK_LEN;
use nixie_clock::{
    AlarmId, AlarmStore, AlarmTime, Brightness, Button, Buttons, Buzzer, ClockContext, ClockMode,
    Controller, Date, Display, DisplayNotifier, RtcWriteNotifier, Time, rtc_write_notifier,
};

type TestController<'a> =
    Controller<'a, ScriptedAnalog, MockDelay, RecordingPwm, RecordingPin, MemoryStorage>;

struct Rig {
    context: ClockContext,
    notifier: DisplayNotifier,
    writes: RtcWriteNotifier,
    buzzer_log: PinLog,
    pwm: RecordingPwm,
    storage: MemoryStorage,
}

impl Rig {
    /// A rig at 12:00:30, away from any alarm minute.
    fn new(storage: MemoryStorage) -> Self {
        let context = ClockContext::new();
        context.sync(Date::new(1, 1, 25), Time::new(12, 0, 30));
        Self {
            context,
            notifier: Display::notifier(),
            writes: rtc_write_notifier(),
            buzzer_log: Rc::new(RefCell::new(Vec::new())),
            pwm: RecordingPwm::default(),
            storage,
        }
    }

    fn controller(&self, script: &[Button]) -> TestController<'_> {
        Controller::new(
            &self.context,
            Display::new(&self.notifier),
            &self.writes,
            Buttons::new(ScriptedAnalog::new(script), MockDelay::default()),
            self.pwm.clone(),
            Buzzer::new(RecordingPin::new("buzzer", &self.buzzer_log)),
            AlarmStore::new(self.storage.clone()),
        )
    }

    fn stored(&self) -> Vec<u8> {
        self.storage.contents(0, ALARM_BLOCK_LEN)
    }
}

#[test]
fn boot_loads_persisted_alarms() {
    let rig = Rig::new(MemoryStorage::with_contents(0, &[1, 0, 6, 45, 0, 0]));
    let controller = rig.controller(&[]);
    assert!(controller.alarms().enabled(AlarmId::One));
    assert_eq!(controller.alarms().time(AlarmId::One), AlarmTime::new(6, 45));
}

#[test]
fn every_step_nudges_brightness() {
    let rig = Rig::new(MemoryStorage::default());
    let mut controller = rig.controller(&[]);
    block_on(controller.step()).unwrap();
    block_on(controller.step()).unwrap();
    // Bright room from full brightness: stays at 100.
    assert_eq!(controller.brightness(), Brightness::new(100));
    assert_eq!(rig.pwm.duties.borrow().len(), 2);
}

#[test]
fn mode_button_toggles_once_per_press() {
    let rig = Rig::new(MemoryStorage::default());
    let mut controller = rig.controller(&[Button::Mode, Button::Mode, Button::None]);
    block_on(controller.step()).unwrap();
    assert_eq!(rig.context.mode(), ClockMode::DisplayDateTime);
    block_on(controller.step()).unwrap();
    assert_eq!(rig.context.mode(), ClockMode::DisplayDateTime);
}

#[test]
fn short_press_enables_a_disabled_alarm() {
    let rig = Rig::new(MemoryStorage::default());
    let mut controller = rig.controller(&[Button::Alarm2, Button::None]);
    block_on(controller.step()).unwrap();
    assert!(controller.alarms().enabled(AlarmId::Two));
    assert_eq!(rig.stored(), [0, 1, 0, 0, 0, 0]);
    assert_eq!(rig.context.mode(), ClockMode::DisplayTime);
}

#[test]
fn short_press_disables_an_enabled_alarm() {
    let rig = Rig::new(MemoryStorage::with_contents(0, &[1, 0, 6, 45, 0, 0]));
    let mut controller = rig.controller(&[Button::Alarm1, Button::None]);
    block_on(controller.step()).unwrap();
    assert!(!controller.alarms().enabled(AlarmId::One));
    assert_eq!(rig.stored(), [0, 0, 6, 45, 0, 0]);
}

#[test]
fn holding_an_alarm_button_edits_and_enables_it() {
    let rig = Rig::new(MemoryStorage::with_contents(0, &[0, 0, 6, 45, 0, 0]));
    let mut script = vec![Button::Alarm1; 45];
    script.extend([
        Button::None,
        Button::Up,
        Button::None,
        Button::Alarm1,
        Button::None,
        Button::Up,
        Button::Up,
        Button::Alarm1,
        Button::None,
    ]);
    let mut controller = rig.controller(&script);
    rig.context.set_mode(ClockMode::DisplayDateTime);

    block_on(controller.step()).unwrap();

    assert_eq!(controller.alarms().time(AlarmId::One), AlarmTime::new(7, 47));
    assert!(controller.alarms().enabled(AlarmId::One));
    assert_eq!(rig.stored(), [1, 0, 7, 47, 0, 0]);
    assert_eq!(rig.context.mode(), ClockMode::DisplayDateTime);
}

#[test]
fn holding_set_edits_date_and_time() {
    let rig = Rig::new(MemoryStorage::default());
    rig.context
        .sync(Date::new(15, 8, 24), Time::new(7, 45, 30));
    let mut script = vec![Button::Set; 45];
    script.push(Button::None);
    // Day up one, then advance through all six fields.
    script.extend([Button::Up, Button::None]);
    for _ in 0..6 {
        script.extend([Button::Alarm2, Button::None]);
    }
    let mut controller = rig.controller(&script);

    block_on(controller.step()).unwrap();

    let edited = (Date::new(16, 8, 24), Time::new(7, 45, 30));
    assert_eq!(rig.writes.try_take(), Some(edited));
    assert_eq!((rig.context.date(), rig.context.time()), edited);
    // The time-update task resumes sync once it has written the RTC.
    assert!(rig.context.sync_paused());
    assert_eq!(rig.context.mode(), ClockMode::DisplayTime);
}

#[test]
fn short_set_press_does_nothing() {
    let rig = Rig::new(MemoryStorage::default());
    let mut controller = rig.controller(&[Button::Set, Button::None]);
    block_on(controller.step()).unwrap();
    assert!(!rig.context.sync_paused());
    assert_eq!(rig.writes.try_take(), None);
}

#[test]
fn alarm_rings_at_its_minute_until_silenced() {
    let rig = Rig::new(MemoryStorage::with_contents(0, &[1, 0, 7, 30, 0, 0]));
    rig.context.sync(Date::new(1, 1, 25), Time::new(7, 30, 0));
    let mut controller = rig.controller(&[Button::None, Button::None, Button::Alarm1, Button::None]);

    block_on(controller.step()).unwrap();

    assert!(!controller.alarms().enabled(AlarmId::One));
    assert_eq!(rig.stored(), [0, 0, 7, 30, 0, 0]);
    let buzzer = common::writes_to(&rig.buzzer_log, "buzzer");
    assert_eq!(buzzer, [true, false, true, false, false]);
}

#[test]
fn alarm_does_not_ring_off_its_minute() {
    let rig = Rig::new(MemoryStorage::with_contents(0, &[1, 0, 7, 30, 0, 0]));
    rig.context.sync(Date::new(1, 1, 25), Time::new(7, 30, 1));
    let mut controller = rig.controller(&[]);

    block_on(controller.step()).unwrap();

    assert!(controller.alarms().enabled(AlarmId::One));
    assert!(rig.buzzer_log.borrow().is_empty());
}
