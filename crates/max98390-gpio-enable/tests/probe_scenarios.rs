//! Probe/remove behaviour against scripted platform devices.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//!
//! Run with: cargo test -p max98390-gpio-enable --test probe_scenarios

use embedded_hal::digital::PinState;
use max98390_gpio_enable::{Max98390GpioEnable, MAX98390_ACPI_IDS, POWER_UP_SETTLE_MS};
use platform::mocks::{Event, MockDelay, MockDevice};
use platform::{AcpiDeviceId, DriverError, GpioError, PlatformDriver};

const DEV_NAME: &str = "i2c-MAX98390:00";

fn max98390_id() -> &'static AcpiDeviceId {
    MAX98390_ACPI_IDS.first().expect("table has entries")
}

/// Device plus a delay sharing its journal.
fn rig(dev: MockDevice) -> (MockDevice, MockDelay) {
    let delay = MockDelay::with_journal(dev.journal());
    (dev, delay)
}

// ── Scenario A: primary name present ────────────────────────────────────────

#[test]
fn scenario_a_primary_gpio_powers_amp() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390").with_gpio("enable"));
    let mut driver = Max98390GpioEnable::new(delay.clone());

    let data = driver
        .probe(&mut dev, max98390_id())
        .expect("probe should succeed with the primary line");

    let line = data.enable_gpio().expect("line stored in state");
    assert_eq!(line.con_id(), "enable");
    assert_eq!(line.state(), Some(PinState::High));
    assert_eq!(dev.lookup_count("amp-enable"), 0, "no fallback when primary works");
    assert_eq!(delay.total_ms(), u64::from(POWER_UP_SETTLE_MS));
}

#[test]
fn scenario_a_settle_delay_follows_power_up() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390").with_gpio("enable"));
    let mut driver = Max98390GpioEnable::new(delay);
    driver.probe(&mut dev, max98390_id()).unwrap();

    let events = dev.events();
    let set_high = events
        .iter()
        .position(|e| matches!(e, Event::Set { state: PinState::High, .. }))
        .expect("line driven high");
    let settle = events
        .iter()
        .position(|e| matches!(e, Event::Delay { .. }))
        .expect("settle delay observed");
    assert!(set_high < settle, "delay must come after power-up: {events:?}");
    assert_eq!(events.last(), Some(&Event::Delay { ns: 10_000_000 }));
}

#[test]
fn scenario_a_alternate_acpi_id() {
    let mxim = MAX98390_ACPI_IDS
        .iter()
        .find(|id| id.id() == "MXIM8390")
        .expect("MXIM8390 in table");
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MXIM8390").with_gpio("enable"));
    let mut driver = Max98390GpioEnable::new(delay);
    driver.probe(&mut dev, mxim).unwrap();
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
}

// ── Scenario B: fallback name ───────────────────────────────────────────────

#[test]
fn scenario_b_fallback_gpio_powers_amp() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390").with_gpio("amp-enable"));
    let mut driver = Max98390GpioEnable::new(delay.clone());

    let data = driver.probe(&mut dev, max98390_id()).unwrap();

    assert_eq!(data.enable_gpio().map(|l| l.con_id()), Some("amp-enable"));
    assert_eq!(dev.pin_state("amp-enable"), Some(PinState::High));
    assert_eq!(dev.lookup_count("enable"), 1);
    assert_eq!(dev.lookup_count("amp-enable"), 1);
    assert_eq!(delay.total_ms(), 10);
}

#[test]
fn scenario_b_any_non_deferred_error_triggers_fallback() {
    for err in [
        GpioError::NotFound,
        GpioError::Busy,
        GpioError::InvalidArgument,
        GpioError::Io,
    ] {
        let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390")
            .with_gpio("enable")
            .with_gpio("amp-enable")
            .with_lookup_errors("enable", [err]));
        let mut driver = Max98390GpioEnable::new(delay);

        let data = driver.probe(&mut dev, max98390_id()).unwrap();
        assert_eq!(data.enable_gpio().map(|l| l.con_id()), Some("amp-enable"), "{err:?}");
        assert_eq!(dev.pin_state("enable"), None, "{err:?}: primary never configured");
    }
}

// ── Scenario C: provider not ready ──────────────────────────────────────────

#[test]
fn scenario_c_deferral_skips_fallback() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390")
        .with_gpio("enable")
        .with_gpio("amp-enable")
        .with_lookup_errors("enable", [GpioError::ProbeDeferred]));
    let mut driver = Max98390GpioEnable::new(delay.clone());

    let err = driver.probe(&mut dev, max98390_id()).err();

    assert_eq!(err, Some(DriverError::ProbeDeferred));
    assert_eq!(dev.lookup_count("amp-enable"), 0);
    assert!(!dev.was_asserted());
    assert_eq!(delay.total_ns(), 0);
}

#[test]
fn scenario_c_reprobe_after_provider_ready() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390")
        .with_gpio("enable")
        .with_lookup_errors("enable", [GpioError::ProbeDeferred]));
    let mut driver = Max98390GpioEnable::new(delay);

    assert_eq!(
        driver.probe(&mut dev, max98390_id()).err(),
        Some(DriverError::ProbeDeferred)
    );
    let data = driver.probe(&mut dev, max98390_id()).unwrap();
    assert_eq!(data.enable_gpio().map(|l| l.con_id()), Some("enable"));
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
}

// ── Scenario D: both names fail ─────────────────────────────────────────────

#[test]
fn scenario_d_both_lookups_fail() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390")
        .with_lookup_errors("amp-enable", [GpioError::Busy]));
    let mut driver = Max98390GpioEnable::new(delay.clone());

    let err = driver.probe(&mut dev, max98390_id()).err();

    assert_eq!(
        err,
        Some(DriverError::GpioAcquisitionFailed(GpioError::Busy)),
        "the fallback's error is propagated"
    );
    assert_eq!(dev.lookup_count("enable"), 1);
    assert_eq!(dev.lookup_count("amp-enable"), 1, "fallback attempted exactly once");
    assert!(!dev.was_asserted());
    assert_eq!(delay.total_ns(), 0);
}

#[test]
fn scenario_d_errno_reports_fallback_failure() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390"));
    let mut driver = Max98390GpioEnable::new(delay);
    let err = driver
        .probe(&mut dev, max98390_id())
        .err()
        .expect("probe must fail");
    assert_eq!(err, DriverError::GpioAcquisitionFailed(GpioError::NotFound));
    assert_eq!(err.errno(), -2);
}

// ── Allocation ──────────────────────────────────────────────────────────────

#[test]
fn out_of_memory_is_fatal_and_touches_nothing() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390")
        .with_gpio("enable")
        .with_failing_allocation());
    let mut driver = Max98390GpioEnable::new(delay.clone());

    let err = driver.probe(&mut dev, max98390_id()).err();

    assert_eq!(err, Some(DriverError::OutOfMemory));
    assert_eq!(dev.lookup_count("enable"), 0);
    assert_eq!(dev.pin_state("enable"), None);
    assert_eq!(delay.total_ns(), 0);
}

// ── Remove ──────────────────────────────────────────────────────────────────

#[test]
fn remove_keeps_amp_powered() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390").with_gpio("enable"));
    let mut driver = Max98390GpioEnable::new(delay);
    let mut data = driver.probe(&mut dev, max98390_id()).unwrap();

    assert_eq!(driver.remove(&mut dev, Some(&mut data)), Ok(()));
    drop(data);

    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
    assert!(!dev.was_deasserted());
    assert!(!dev.is_claimed("enable"), "handle released with the state");
}

#[test]
fn remove_without_state_succeeds() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390").with_gpio("enable"));
    let mut driver = Max98390GpioEnable::new(delay);
    assert_eq!(driver.remove(&mut dev, None), Ok(()));
    assert!(dev.events().is_empty());
}

#[test]
fn remove_with_empty_state_succeeds() {
    let (mut dev, delay) = rig(MockDevice::new(DEV_NAME, "MAX98390"));
    let mut driver = Max98390GpioEnable::new(delay);
    let mut empty = max98390_gpio_enable::PowerEnableState::new();
    assert_eq!(driver.remove(&mut dev, Some(&mut empty)), Ok(()));
    assert!(!dev.was_deasserted());
}
