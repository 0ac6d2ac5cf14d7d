//! Host-level tests for the brightness curve and rate limiting.

mod common;

use common::{MockDelay, RecordingPwm, ScriptedAnalog};
use embassy_futures::block_on;
use nixie_clock::Brightness;

#[test]
fn sensor_range_maps_onto_half_to_full() {
    assert_eq!(Brightness::target_percent(80), 50);
    assert_eq!(Brightness::target_percent(455), 75);
    assert_eq!(Brightness::target_percent(830), 100);
}

#[test]
fn target_is_clamped_outside_calibration() {
    assert_eq!(Brightness::target_percent(0), 50);
    assert_eq!(Brightness::target_percent(1023), 100);
}

#[test]
fn one_update_moves_one_point() {
    let mut brightness = Brightness::new(50);
    assert_eq!(brightness.step(830), 51);
    assert_eq!(brightness.percent(), 51);

    let mut brightness = Brightness::new(100);
    assert_eq!(brightness.step(0), 99);

    let mut brightness = Brightness::new(75);
    assert_eq!(brightness.step(455), 75);
}

#[test]
fn curve_end_points() {
    assert_eq!(Brightness::duty(100), 254);
    assert_eq!(Brightness::duty(0), 0);
}

#[test]
fn curve_is_monotonic() {
    let duties: Vec<u8> = (0..=100).map(Brightness::duty).collect();
    assert!(duties.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn update_drives_pwm_with_stepped_duty() {
    let pwm = RecordingPwm::default();
    let mut inputs = ScriptedAnalog::new(&[]).with_light(830);
    let mut brightness = Brightness::new(50);
    let duty = block_on(brightness.update(
        &mut inputs,
        &mut MockDelay::default(),
        &mut pwm.clone(),
    ))
    .unwrap();
    assert_eq!(brightness.percent(), 51);
    assert_eq!(duty, Brightness::duty(51));
    assert_eq!(*pwm.duties.borrow(), vec![u16::from(Brightness::duty(51))]);
    assert_eq!(inputs.light_reads.get(), 5);
}
