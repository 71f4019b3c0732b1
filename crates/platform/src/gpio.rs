//! GPIO consumer lookup
//!
//! Drivers request lines from their device by connection name and index,
//! with flags saying how the provider must configure the line before handing
//! it over. The returned line implements `embedded_hal::digital::OutputPin`,
//! whose setters are blocking and may sleep (expanders on I²C/SPI), so they
//! are only called from contexts that are allowed to sleep.

use embedded_hal::digital::PinState;

/// How the provider configures a line at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioFlags {
    /// Leave direction and value untouched.
    AsIs,
    /// Configure as input.
    In,
    /// Configure as output, initial logical value low.
    OutLow,
    /// Configure as output, initial logical value high.
    OutHigh,
}

impl GpioFlags {
    /// Initial logical output value, if the flags configure an output.
    pub const fn initial_state(self) -> Option<PinState> {
        match self {
            Self::OutLow => Some(PinState::Low),
            Self::OutHigh => Some(PinState::High),
            Self::AsIs | Self::In => None,
        }
    }

    /// `true` if the line is configured as an output.
    pub const fn is_output(self) -> bool {
        matches!(self, Self::OutLow | Self::OutHigh)
    }
}

/// Connection name and index of a line in the device's GPIO resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioLookup {
    /// Connection ID (`"enable"`, `"reset"`, …).
    pub con_id: &'static str,
    /// Index within that connection.
    pub index: u32,
}

impl GpioLookup {
    /// Lookup key for `con_id`/`index`.
    pub const fn new(con_id: &'static str, index: u32) -> Self {
        Self { con_id, index }
    }
}
