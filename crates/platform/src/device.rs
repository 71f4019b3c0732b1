//! Device binding abstraction
//!
//! A [`Device`] is one hardware instance enumerated by firmware. The registry
//! owns it; drivers only see it for the duration of probe and remove.

use core::alloc::Layout;

use embedded_hal::digital::OutputPin;

use crate::error::GpioError;
use crate::gpio::GpioFlags;

/// Device-managed allocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocError;

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "device-managed allocation failed")
    }
}

/// One enumerated hardware instance a driver can bind to.
///
/// Resources obtained through this trait (memory reservations, GPIO lines)
/// are scoped to the binding: they are released when the registry drops the
/// driver data and the device, never by explicit driver code.
pub trait Device {
    /// Output line type handed out by [`Device::gpiod_get_index`].
    type Line: OutputPin;

    /// Device name used to tag log lines.
    fn name(&self) -> &str;

    /// Firmware hardware ID (`_HID`) matched against driver tables.
    fn acpi_hid(&self) -> &str;

    /// Reserve device-managed memory for per-binding driver state.
    fn devm_reserve(&mut self, layout: Layout) -> Result<(), AllocError>;

    /// Request line `index` of connection `con_id`, configured per `flags`.
    ///
    /// Returns [`GpioError::ProbeDeferred`] while the GPIO controller has not
    /// probed yet.
    fn gpiod_get_index(
        &mut self,
        con_id: &str,
        index: u32,
        flags: GpioFlags,
    ) -> Result<Self::Line, GpioError>;
}
