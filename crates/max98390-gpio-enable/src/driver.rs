//! MAX98390 power-enable probe and remove
//!
//! Probe reserves the per-binding state, requests the enable line as an
//! output starting low, drives it high with the blocking setter and waits
//! [`POWER_UP_SETTLE_MS`]. Remove leaves the line high: dropping amplifier
//! power on unbind causes an audible pop and loses codec state downstream.

use core::alloc::Layout;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use platform::{
    dev_err, dev_info, AcpiDeviceId, Device, DriverError, DriverInfo, GpioError, GpioFlags,
    GpioLookup, PlatformDriver,
};

use crate::config::{AMP_ENABLE_GPIO, DRIVER_INFO, ENABLE_GPIO, POWER_UP_SETTLE_MS};
use crate::state::PowerEnableState;

/// MAX98390 amplifier power-enable driver.
///
/// Owns the delay provider used for the post-power-up settle wait. The
/// delay is blocking: probe runs on the host's binding thread, which is
/// allowed to sleep.
pub struct Max98390GpioEnable<T> {
    delay: T,
}

impl<T: DelayNs> Max98390GpioEnable<T> {
    /// Create the driver around a blocking delay provider.
    pub fn new(delay: T) -> Self {
        Self { delay }
    }

    /// Give back the delay provider.
    pub fn release(self) -> T {
        self.delay
    }
}

/// Request `lookup` as an output that starts low.
fn request_output<D: Device>(dev: &mut D, lookup: GpioLookup) -> Result<D::Line, GpioError> {
    dev.gpiod_get_index(lookup.con_id, lookup.index, GpioFlags::OutLow)
}

/// Look up the enable line under its primary name, then under the alternate
/// name unless the provider asked to defer.
fn acquire_enable_gpio<D: Device>(dev: &mut D) -> Result<D::Line, DriverError> {
    let err = match request_output(dev, ENABLE_GPIO) {
        Ok(line) => return Ok(line),
        Err(GpioError::ProbeDeferred) => {
            dev_info!(dev.name(), "GPIO not ready, deferring probe");
            return Err(DriverError::ProbeDeferred);
        }
        Err(err) => err,
    };
    dev_err!(dev.name(), "Failed to get {} GPIO: {}", ENABLE_GPIO.con_id, err.errno());

    match request_output(dev, AMP_ENABLE_GPIO) {
        Ok(line) => {
            dev_info!(dev.name(), "Using {} GPIO", AMP_ENABLE_GPIO.con_id);
            Ok(line)
        }
        Err(err) => {
            dev_err!(
                dev.name(),
                "Failed to get {} GPIO: {}",
                AMP_ENABLE_GPIO.con_id,
                err.errno()
            );
            Err(DriverError::from(err))
        }
    }
}

impl<D, T> PlatformDriver<D> for Max98390GpioEnable<T>
where
    D: Device,
    T: DelayNs,
{
    type Data = PowerEnableState<D::Line>;

    const INFO: DriverInfo = DRIVER_INFO;

    fn probe(
        &mut self,
        dev: &mut D,
        id: &AcpiDeviceId,
    ) -> Result<PowerEnableState<D::Line>, DriverError> {
        dev_info!(dev.name(), "Probing MAX98390 GPIO enable driver ({})", id.id());

        if dev.devm_reserve(Layout::new::<PowerEnableState<D::Line>>()).is_err() {
            dev_err!(dev.name(), "Failed to allocate driver state");
            return Err(DriverError::OutOfMemory);
        }
        let mut data = PowerEnableState::new();

        let gpio = data.set_enable_gpio(acquire_enable_gpio(dev)?);

        // May sleep: the line can sit behind an I2C/SPI expander.
        if let Err(err) = gpio.set_high() {
            let err = GpioError::from_pin_error(&err);
            dev_err!(dev.name(), "Failed to set power GPIO high: {}", err.errno());
            return Err(DriverError::Gpio(err));
        }
        dev_info!(dev.name(), "MAX98390 power GPIO set to HIGH");

        self.delay.delay_ms(POWER_UP_SETTLE_MS);

        dev_info!(dev.name(), "MAX98390 GPIO enable driver initialized successfully");
        Ok(data)
    }

    fn remove(
        &mut self,
        dev: &mut D,
        data: Option<&mut PowerEnableState<D::Line>>,
    ) -> Result<(), DriverError> {
        if data.is_some_and(|data| data.enable_gpio().is_some()) {
            dev_info!(dev.name(), "MAX98390 GPIO enable driver removed (keeping power on)");
        }
        Ok(())
    }
}
