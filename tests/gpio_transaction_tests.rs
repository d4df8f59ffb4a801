//! Bus transaction tests for the CH423 state machine
//!
//! These tests check the exact I2C traffic each operation produces, using a
//! mock bus instead of hardware.

use ch423::{Ch423, DriveMode, Error, GpioDirection, GpioLevel, GpioPin};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

const SET_OC_L: u8 = 0x22;
const SET_OC_H: u8 = 0x23;
const SET_CFG: u8 = 0x24;
const READ_IO: u8 = 0x26;
const SET_IO: u8 = 0x30;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn reset_sequence() -> Vec<Transaction> {
    vec![
        Transaction::write(SET_CFG, vec![0x00]),
        Transaction::write(SET_OC_L, vec![0x00]),
        Transaction::write(SET_OC_H, vec![0x00]),
    ]
}

/// Attaches a chip to a mock expecting the reset sequence followed by `rest`.
fn attach(rest: Vec<Transaction>) -> (Ch423<I2cMock>, I2cMock) {
    init_logger();
    let mut expectations = reset_sequence();
    expectations.extend(rest);
    let bus = I2cMock::new(&expectations);
    let chip = Ch423::new(bus.clone()).expect("reset sequence");
    (chip, bus)
}

fn pin(n: u8) -> GpioPin {
    GpioPin::new(n).unwrap()
}

#[test]
fn test_initialize_writes_config_and_both_oc_banks() {
    let (chip, mut bus) = attach(vec![]);

    let shadow = chip.shadow().unwrap();
    assert_eq!(shadow.config.bits(), 0x00);
    assert_eq!(shadow.direction, GpioDirection::Input);
    assert_eq!(shadow.outputs, 0);
    assert!(shadow.synchronized);

    bus.done();
}

#[test]
fn test_output_only_lines_always_report_output() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
    ]);

    for n in 8..24 {
        assert_eq!(chip.gpio_get_direction(pin(n)).unwrap(), GpioDirection::Output);
    }
    chip.gpio_set_direction_output(pin(0), GpioLevel::Low).unwrap();
    for n in 8..24 {
        assert_eq!(chip.gpio_get_direction(pin(n)).unwrap(), GpioDirection::Output);
    }

    bus.done();
}

#[test]
fn test_set_one_twice_writes_once() {
    let (chip, mut bus) = attach(vec![Transaction::write(SET_OC_L, vec![0x02])]);

    chip.gpio_write(pin(9), GpioLevel::High).unwrap();
    chip.gpio_write(pin(9), GpioLevel::High).unwrap();

    bus.done();
}

#[test]
fn test_direction_output_sets_bank_then_line() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_IO, vec![0x01]),
    ]);

    chip.gpio_set_direction_output(pin(0), GpioLevel::High).unwrap();

    let shadow = chip.shadow().unwrap();
    assert_eq!(shadow.direction, GpioDirection::Output);
    assert_eq!(shadow.outputs & 0x01, 0x01);
    assert_eq!(chip.gpio_get_direction(pin(7)).unwrap(), GpioDirection::Output);

    // Same value again: no traffic.
    chip.gpio_write(pin(0), GpioLevel::High).unwrap();

    bus.done();
}

#[test]
fn test_direction_output_low_after_reset_only_writes_config() {
    // The IO shadow is already 0x00, so the IO bank needs no write.
    let (chip, mut bus) = attach(vec![Transaction::write(SET_CFG, vec![0x01])]);

    chip.gpio_set_direction_output(pin(0), GpioLevel::Low).unwrap();
    assert_eq!(chip.gpio_get_direction(pin(0)).unwrap(), GpioDirection::Output);
    assert!(chip.shadow().unwrap().synchronized);

    bus.done();
}

#[test]
fn test_direction_output_when_already_output_skips_config() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_IO, vec![0x01]),
        Transaction::write(SET_IO, vec![0x81]),
    ]);

    chip.gpio_set_direction_output(pin(0), GpioLevel::High).unwrap();
    chip.gpio_set_direction_output(pin(7), GpioLevel::High).unwrap();

    bus.done();
}

#[test]
fn test_direction_input_is_a_no_op_when_already_input() {
    let (chip, mut bus) = attach(vec![]);

    chip.gpio_set_direction_input(pin(3)).unwrap();
    assert_eq!(chip.gpio_get_direction(pin(3)).unwrap(), GpioDirection::Input);

    bus.done();
}

#[test]
fn test_direction_round_trip_keeps_latched_outputs() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_IO, vec![0x04]),
        Transaction::write(SET_CFG, vec![0x00]),
        Transaction::write(SET_CFG, vec![0x01]),
    ]);

    chip.gpio_set_direction_output(pin(2), GpioLevel::High).unwrap();
    chip.gpio_set_direction_input(pin(2)).unwrap();
    // The IO latch still holds 0x04, so only the config changes.
    chip.gpio_set_direction_output(pin(2), GpioLevel::High).unwrap();

    bus.done();
}

#[test]
fn test_io_writes_while_input_are_applied_on_direction_change() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_IO, vec![0x18]),
    ]);

    // Input mode: remembered, not sent.
    chip.gpio_write(pin(3), GpioLevel::High).unwrap();
    assert_eq!(chip.gpio_get_output(pin(3)).unwrap(), GpioLevel::High);

    chip.gpio_set_direction_output(pin(4), GpioLevel::High).unwrap();

    bus.done();
}

#[test]
fn test_invalid_direction_and_drive_mode_requests_issue_no_traffic() {
    let (chip, mut bus) = attach(vec![]);

    let err = chip.gpio_set_direction_input(pin(8)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { pin: 8, .. }));

    let err = chip.gpio_set_drive_mode(pin(3), DriveMode::OpenDrain).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFeature(_)));

    bus.done();
}

#[test]
fn test_direction_output_on_oc_line_only_sets_level() {
    let (chip, mut bus) = attach(vec![Transaction::write(SET_OC_H, vec![0x01])]);

    chip.gpio_set_direction_output(pin(16), GpioLevel::High).unwrap();
    assert_eq!(chip.shadow().unwrap().direction, GpioDirection::Input);

    bus.done();
}

#[test]
fn test_set_multiple_touches_only_high_bank() {
    let (chip, mut bus) = attach(vec![Transaction::write(SET_OC_H, vec![0xAA])]);

    chip.gpio_write_masked(0xFF_0000, 0xAA_0000).unwrap();

    let shadow = chip.shadow().unwrap();
    assert_eq!(shadow.outputs, 0xAA_0000);

    bus.done();
}

#[test]
fn test_set_multiple_across_all_banks_in_order() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_IO, vec![0x0F]),
        Transaction::write(SET_OC_L, vec![0xF0]),
        Transaction::write(SET_OC_H, vec![0x81]),
    ]);

    chip.gpio_set_direction_output(pin(0), GpioLevel::Low).unwrap();
    chip.gpio_write_masked(0xFF_FFFF, 0x81_F0_0F).unwrap();
    // Only the masked lines may change.
    chip.gpio_write_masked(0x00_0001, 0xFF_FFFF).unwrap();

    bus.done();
}

#[test]
fn test_drive_mode_write_skipped_when_unchanged() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x10]),
        Transaction::write(SET_CFG, vec![0x00]),
    ]);

    chip.gpio_set_drive_mode(pin(12), DriveMode::PushPull).unwrap();
    chip.gpio_set_drive_mode(pin(12), DriveMode::OpenDrain).unwrap();
    chip.gpio_set_drive_mode(pin(20), DriveMode::OpenDrain).unwrap();
    chip.gpio_set_drive_mode(pin(20), DriveMode::PushPull).unwrap();

    bus.done();
}

#[test]
fn test_drive_mode_preserves_io_direction_bit() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_CFG, vec![0x01]),
        Transaction::write(SET_CFG, vec![0x11]),
    ]);

    chip.gpio_set_direction_output(pin(1), GpioLevel::Low).unwrap();
    chip.gpio_set_drive_mode(pin(9), DriveMode::OpenDrain).unwrap();
    assert_eq!(chip.config().unwrap().bits(), 0x11);

    bus.done();
}

#[test]
fn test_read_input_always_hits_the_bus() {
    let (chip, mut bus) = attach(vec![
        Transaction::read(READ_IO, vec![0b0010_0000]),
        Transaction::read(READ_IO, vec![0b0000_0000]),
    ]);

    assert_eq!(chip.gpio_read(pin(5)).unwrap(), GpioLevel::High);
    assert_eq!(chip.gpio_read(pin(5)).unwrap(), GpioLevel::Low);

    bus.done();
}

#[test]
fn test_read_output_only_line_still_issues_read() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_OC_L, vec![0x01]),
        Transaction::read(READ_IO, vec![0x00]),
        Transaction::read(READ_IO, vec![0xFF]),
    ]);

    chip.gpio_write(pin(8), GpioLevel::High).unwrap();
    assert_eq!(chip.gpio_read(pin(8)).unwrap(), GpioLevel::High);
    assert_eq!(chip.gpio_read(pin(9)).unwrap(), GpioLevel::Low);

    bus.done();
}

#[test]
fn test_read_masked_combines_io_read_and_oc_shadow() {
    let (chip, mut bus) = attach(vec![
        Transaction::write(SET_OC_L, vec![0x80]),
        Transaction::read(READ_IO, vec![0x5A]),
        Transaction::read(READ_IO, vec![0x5A]),
    ]);

    chip.gpio_write(pin(15), GpioLevel::High).unwrap();
    assert_eq!(chip.gpio_read_masked(0x00_FF_0F).unwrap(), 0x00_80_0A);
    // No IO lines requested: the read still happens, its byte is masked off.
    assert_eq!(chip.gpio_read_masked(0xFF_FF00).unwrap(), 0x00_8000);

    bus.done();
}

#[test]
fn test_release_returns_the_bus() {
    let (chip, mut bus) = attach(vec![Transaction::write(SET_OC_L, vec![0x01])]);

    chip.gpio_write(pin(8), GpioLevel::High).unwrap();
    let mut released = chip.release();
    released.done();

    bus.done();
}
