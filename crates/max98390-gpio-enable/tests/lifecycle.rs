//! Registry-driven lifecycle: load, bind, deferred probe, unbind, unload.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//!
//! Exercises the driver the way the host does: through
//! `platform::DriverRegistry` with the driver's static ACPI table.
//!
//! Run with: RUST_LOG=debug cargo test -p max98390-gpio-enable --test lifecycle

use embedded_hal::digital::PinState;
use max98390_gpio_enable::{Max98390GpioEnable, DRIVER_NAME};
use platform::mocks::{MockDelay, MockDevice};
use platform::{BindingState, DriverError, DriverRegistry, GpioError};

type Registry = DriverRegistry<Max98390GpioEnable<MockDelay>, MockDevice, 8>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn amp(name: &str, hid: &str) -> MockDevice {
    MockDevice::new(name, hid).with_gpio("enable")
}

#[test]
fn load_binds_both_acpi_ids() {
    init_tracing();
    let mut reg = Registry::new();
    let a = reg.add_device(amp("i2c-MAX98390:00", "MAX98390")).unwrap();
    let b = reg.add_device(amp("i2c-MXIM8390:01", "MXIM8390")).unwrap();

    let delay = MockDelay::new();
    assert_eq!(reg.register(Max98390GpioEnable::new(delay.clone())), Ok(2));

    for h in [a, b] {
        assert_eq!(reg.state(h), Some(BindingState::Bound));
        assert_eq!(reg.device(h).unwrap().pin_state("enable"), Some(PinState::High));
    }
    assert_eq!(delay.total_ms(), 20, "one settle wait per device");
    assert_eq!(reg.driver_info().map(|i| i.name), Some(DRIVER_NAME));
}

#[test]
fn unrelated_device_is_left_alone() {
    init_tracing();
    let mut reg = Registry::new();
    reg.register(Max98390GpioEnable::new(MockDelay::new())).unwrap();
    let h = reg.add_device(amp("i2c-ESSX8336:00", "ESSX8336")).unwrap();

    assert_eq!(reg.state(h), Some(BindingState::Unbound));
    let dev = reg.device(h).unwrap();
    assert_eq!(dev.lookup_count("enable"), 0);
    assert_eq!(dev.pin_state("enable"), None);
}

#[test]
fn deferred_probe_binds_once_provider_is_ready() {
    init_tracing();
    let mut reg = Registry::new();
    reg.register(Max98390GpioEnable::new(MockDelay::new())).unwrap();
    let dev = amp("i2c-MAX98390:00", "MAX98390")
        .with_gpio("amp-enable")
        .with_lookup_errors("enable", [GpioError::ProbeDeferred, GpioError::ProbeDeferred]);
    let h = reg.add_device(dev).unwrap();

    assert_eq!(reg.state(h), Some(BindingState::Deferred));
    assert_eq!(reg.retry_deferred(), 0, "provider still not ready");
    assert_eq!(reg.state(h), Some(BindingState::Deferred));
    assert_eq!(reg.retry_deferred(), 1);
    assert_eq!(reg.state(h), Some(BindingState::Bound));

    let dev = reg.device(h).unwrap();
    assert_eq!(dev.lookup_count("amp-enable"), 0, "deferral never falls back");
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
}

#[test]
fn missing_gpio_fails_binding_and_leaves_amp_unpowered() {
    init_tracing();
    let mut reg = Registry::new();
    reg.register(Max98390GpioEnable::new(MockDelay::new())).unwrap();
    let h = reg
        .add_device(MockDevice::new("i2c-MAX98390:00", "MAX98390"))
        .unwrap();

    assert_eq!(
        reg.state(h),
        Some(BindingState::Failed(DriverError::GpioAcquisitionFailed(
            GpioError::NotFound
        )))
    );
    assert!(reg.data(h).is_none());
    assert!(!reg.device(h).unwrap().was_asserted());
}

#[test]
fn unbind_and_rebind_keep_amp_powered() {
    init_tracing();
    let mut reg = Registry::new();
    reg.register(Max98390GpioEnable::new(MockDelay::new())).unwrap();
    let h = reg.add_device(amp("i2c-MAX98390:00", "MAX98390")).unwrap();

    let dev = reg.remove_device(h).unwrap();
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
    assert!(!dev.was_deasserted());
    assert!(!dev.is_claimed("enable"));

    let h = reg.add_device(dev).unwrap();
    assert_eq!(reg.state(h), Some(BindingState::Bound));
    let dev = reg.device(h).unwrap();
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
    assert!(
        !dev.was_deasserted(),
        "rebind requests the line low-configured but never writes low"
    );
}

#[test]
fn module_unload_leaves_amp_powered() {
    init_tracing();
    let mut reg = Registry::new();
    let delay = MockDelay::new();
    reg.register(Max98390GpioEnable::new(delay.clone())).unwrap();
    let h = reg.add_device(amp("i2c-MAX98390:00", "MAX98390")).unwrap();

    let driver = reg.unregister().expect("driver was registered");
    assert_eq!(reg.state(h), Some(BindingState::Unbound));
    assert!(reg.data(h).is_none());

    let dev = reg.device(h).unwrap();
    assert_eq!(dev.pin_state("enable"), Some(PinState::High));
    assert!(!dev.was_deasserted());
    assert!(!dev.is_claimed("enable"));

    let _ = driver.release();
    assert_eq!(delay.total_ms(), 10);
}

#[test]
fn bound_state_holds_single_line() {
    init_tracing();
    let mut reg = Registry::new();
    reg.register(Max98390GpioEnable::new(MockDelay::new())).unwrap();
    let h = reg
        .add_device(amp("i2c-MAX98390:00", "MAX98390").with_gpio("amp-enable"))
        .unwrap();

    let data = reg.data(h).expect("bound device has state");
    assert_eq!(data.enable_gpio().map(|l| l.con_id()), Some("enable"));
    let dev = reg.device(h).unwrap();
    assert!(dev.is_claimed("enable"));
    assert!(!dev.is_claimed("amp-enable"));
}
