//! Firmware for a six-tube nixie clock with two alarms.
//!
//! Runs on a Raspberry Pi Pico RP2040. The display loop and the time-update
//! task run as their own Embassy tasks; the main task runs the controller.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "Single-threaded")]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Delay, Instant};
use nixie_clock::display::run_display;
use nixie_clock::hardware::{Hardware, RtcSpi};
use nixie_clock::{
    AlarmStore, Buttons, Buzzer, ClockContext, Controller, Display, DisplayNotifier, Ds3234,
    Never, NixieTubes, Result, RtcWriteNotifier, TimeKeeper, rtc_write_notifier,
};
use oorandom::Rand32;
use panic_probe as _;

static CLOCK: ClockContext = ClockContext::new();
static DISPLAY_NOTIFIER: DisplayNotifier = Display::notifier();
static RTC_WRITES: RtcWriteNotifier = rtc_write_notifier();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Never> {
    let hardware = Hardware::new()?;
    let display = Display::new(&DISPLAY_NOTIFIER);

    let rng = Rand32::new(Instant::now().as_ticks());
    let token = display_task(hardware.tubes, rng)?;
    spawner.spawn(token);

    let mut time_keeper = TimeKeeper::new(
        Ds3234::new(hardware.rtc),
        &CLOCK,
        display,
        &RTC_WRITES,
    );
    if let Err(err) = time_keeper.init().await {
        error!("RTC init failed: {}", err);
    }
    let token = time_keeper_task(time_keeper, hardware.square_wave)?;
    spawner.spawn(token);

    let mut controller = Controller::new(
        &CLOCK,
        display,
        &RTC_WRITES,
        Buttons::new(hardware.analog, Delay),
        hardware.brightness_pwm,
        Buzzer::new(hardware.buzzer),
        AlarmStore::new(hardware.storage),
    );
    info!("Nixie clock running");
    Ok(controller.run().await)
}

#[embassy_executor::task]
async fn display_task(tubes: NixieTubes<Output<'static>>, rng: Rand32) -> ! {
    match run_display(&DISPLAY_NOTIFIER, tubes, Delay, rng).await {}
}

#[embassy_executor::task]
async fn time_keeper_task(
    mut time_keeper: TimeKeeper<'static, RtcSpi>,
    mut square_wave: Input<'static>,
) -> ! {
    match time_keeper.run(&mut square_wave).await {}
}
