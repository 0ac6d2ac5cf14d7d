//! Host-level tests for tube frames and the shift-register protocol.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{MockDelay, PinLog, recording_tubes, writes_to};
use embassy_futures::block_on;
use embassy_time::Duration;
use nixie_clock::Frame;
use nixie_clock::nixie::{BLANK_FIELD, BLANK_PATTERN, DIGIT_PATTERNS};
use oorandom::Rand32;

#[test]
fn digit_patterns_clear_one_line() {
    for (digit, pattern) in DIGIT_PATTERNS.iter().enumerate() {
        assert_eq!(*pattern, 0x03FF & !(1 << digit));
    }
}

#[test]
fn patterns_go_out_last_field_first_ones_before_tens() {
    let patterns = Frame::new([12, 34, 56]).patterns();
    let expected = [6, 5, 4, 3, 2, 1].map(|digit| DIGIT_PATTERNS[digit]);
    assert_eq!(patterns, expected);
}

#[test]
fn out_of_range_field_is_blank() {
    let patterns = Frame::new([7, BLANK_FIELD, 100]).patterns();
    assert_eq!(
        patterns,
        [
            BLANK_PATTERN,
            BLANK_PATTERN,
            BLANK_PATTERN,
            BLANK_PATTERN,
            DIGIT_PATTERNS[7],
            DIGIT_PATTERNS[0],
        ]
    );
}

#[test]
fn blanking_one_field_keeps_the_others() {
    let frame = Frame::new([1, 2, 3]).with_blank_field(1);
    assert_eq!(frame.fields, [1, BLANK_FIELD, 3]);
    assert_eq!(Frame::new([1, 2, 3]).with_blank_field(9).fields, [1, 2, 3]);
}

#[test]
fn random_frames_are_all_digits() {
    let mut rng = Rand32::new(7);
    for _ in 0..100 {
        assert!(Frame::random(&mut rng).fields.iter().all(|field| *field <= 99));
    }
}

#[test]
fn show_shifts_sixty_bits_msb_first_then_strobes() {
    let log: PinLog = Rc::new(RefCell::new(Vec::new()));
    let mut tubes = recording_tubes(&log);
    tubes
        .show(&Frame::new([0, 0, 9]).with_decimal_point(true))
        .unwrap();

    let data = writes_to(&log, "data");
    assert_eq!(data.len(), 60);
    // First tube out is the ones digit of field 2: 9, pattern 0b01_1111_1111.
    assert_eq!(&data[..10], &[false, true, true, true, true, true, true, true, true, true]);
    assert_eq!(writes_to(&log, "clock").len(), 120);
    assert_eq!(writes_to(&log, "strobe"), [true, false]);
    assert_eq!(writes_to(&log, "dp"), [true]);
}

#[test]
fn strobe_comes_after_the_last_clock() {
    let log: PinLog = Rc::new(RefCell::new(Vec::new()));
    let mut tubes = recording_tubes(&log);
    tubes.show(&Frame::BLANK).unwrap();
    let entries = log.borrow();
    let last_clock = entries.iter().rposition(|(pin, _)| *pin == "clock").unwrap();
    let first_strobe = entries.iter().position(|(pin, _)| *pin == "strobe").unwrap();
    assert!(first_strobe > last_clock);
}

#[test]
fn fade_spends_the_whole_duration_in_fifty_slots() {
    let log: PinLog = Rc::new(RefCell::new(Vec::new()));
    let mut tubes = recording_tubes(&log);
    let delay = MockDelay::default();
    block_on(tubes.fade(
        &Frame::new([12, 0, 1]),
        &Frame::new([12, 0, 0]),
        Duration::from_millis(500),
        &mut delay.clone(),
    ))
    .unwrap();
    assert_eq!(delay.elapsed_us(), 500_000);
    // Source then target in every slot.
    assert_eq!(writes_to(&log, "strobe").len(), 2 * 2 * 50);
}
