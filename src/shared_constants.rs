use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

pub const ONE_SECOND: Duration = Duration::from_secs(1);

// Input decoding
pub const FRONT_SAMPLE_COUNT: u16 = 25;
pub const REAR_SAMPLE_COUNT: u16 = 5;
pub const ANALOG_SAMPLE_DELAY: Duration = Duration::from_micros(200);
pub const BUTTON_TOLERANCE: u16 = 10;
pub const ALARM1_BUTTON_LEVEL: u16 = 0;
pub const UP_BUTTON_LEVEL: u16 = 132;
pub const DOWN_BUTTON_LEVEL: u16 = 320;
pub const ALARM2_BUTTON_LEVEL: u16 = 487;
pub const MODE_BUTTON_LEVEL: u16 = 0;
pub const SET_BUTTON_LEVEL: u16 = 502;
pub const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(800);

// Brightness
pub const LIGHT_SAMPLE_COUNT: u16 = 5;
pub const LIGHT_DARK_LEVEL: u16 = 80;
pub const LIGHT_BRIGHT_LEVEL: u16 = 830;
pub const MIN_BRIGHTNESS_PERCENT: u8 = 50;
pub const MAX_BRIGHTNESS_PERCENT: u8 = 100;
pub const MAX_PWM_DUTY: u8 = 255;

// Rendering
pub const FADE_STEPS: u32 = 50;
pub const FADE_DURATION: Duration = Duration::from_millis(500);
pub const SWITCH_INTERVAL_SECONDS: u8 = 5;
pub const CLEANING_PERIOD_MINUTES: u8 = 20;
pub const CLEANING_WINDOW_SECONDS: u8 = 3;
pub const CLEANING_FRAME_INTERVAL: Duration = Duration::from_millis(100);
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(500);

// Configuration flows
pub const EDIT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const EDIT_REPEAT_DELAY: Duration = Duration::from_millis(150);
pub const FIELD_ADVANCE_DEBOUNCE: Duration = Duration::from_millis(300);
pub const ALARM_PREVIEW_DURATION: Duration = ONE_SECOND;

// Alarm ringing
pub const BUZZER_HALF_PERIOD: Duration = Duration::from_millis(500);
pub const ALARM_SILENCED_PAUSE: Duration = ONE_SECOND;

// Persistent storage
pub const ALARM_STORE_OFFSET: u32 = 0;

/// Sleep for `duration` on any async delay provider.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Every duration used here is far below u32::MAX microseconds"
)]
pub(crate) async fn pause(delay: &mut impl DelayNs, duration: Duration) {
    delay.delay_us(duration.as_micros() as u32).await;
}
