//! Driver and GPIO error kinds
//!
//! Both enums carry the Linux errno they correspond to so log lines show the
//! same numbers a kernel driver would print.

/// `-ENOENT`: no such GPIO mapping.
pub const ENOENT: i32 = -2;
/// `-EIO`: I/O error on the line or its provider.
pub const EIO: i32 = -5;
/// `-ENOMEM`: allocation failure.
pub const ENOMEM: i32 = -12;
/// `-EBUSY`: line already claimed by another consumer.
pub const EBUSY: i32 = -16;
/// `-EINVAL`: malformed lookup or flags.
pub const EINVAL: i32 = -22;
/// `-EPROBE_DEFER`: provider not ready, retry the probe later.
pub const EPROBE_DEFER: i32 = -517;

/// Errors returned by a GPIO provider when a consumer requests or drives a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The provider (GPIO controller driver) has not probed yet.
    ProbeDeferred,
    /// No line with the requested name/index is mapped to the device.
    NotFound,
    /// The line is held by another consumer.
    Busy,
    /// The request itself is invalid (bad flags, bad index).
    InvalidArgument,
    /// Bus or controller failure while configuring or driving the line.
    Io,
}

impl GpioError {
    /// Linux errno (negative) for this error.
    pub const fn errno(self) -> i32 {
        match self {
            Self::ProbeDeferred => EPROBE_DEFER,
            Self::NotFound => ENOENT,
            Self::Busy => EBUSY,
            Self::InvalidArgument => EINVAL,
            Self::Io => EIO,
        }
    }

    /// Map a pin error from any `embedded-hal` implementation.
    ///
    /// `embedded-hal` only distinguishes `ErrorKind::Other`, so every
    /// driver-side set failure ends up as [`GpioError::Io`].
    pub fn from_pin_error<E: embedded_hal::digital::Error>(err: &E) -> Self {
        let _ = err.kind();
        Self::Io
    }
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GpioError {}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ProbeDeferred => write!(f, "GPIO provider not ready"),
            Self::NotFound => write!(f, "GPIO not found"),
            Self::Busy => write!(f, "GPIO busy"),
            Self::InvalidArgument => write!(f, "invalid GPIO request"),
            Self::Io => write!(f, "GPIO I/O error"),
        }
    }
}

/// Errors a platform driver returns from probe or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Per-binding state could not be allocated. Fatal.
    OutOfMemory,
    /// A dependency is not ready; the registry re-runs probe later.
    ProbeDeferred,
    /// Every lookup for a required GPIO failed. Carries the last error.
    GpioAcquisitionFailed(GpioError),
    /// An acquired line could not be driven.
    Gpio(GpioError),
}

impl DriverError {
    /// Linux errno (negative) for this error.
    pub const fn errno(self) -> i32 {
        match self {
            Self::OutOfMemory => ENOMEM,
            Self::ProbeDeferred => EPROBE_DEFER,
            Self::GpioAcquisitionFailed(e) | Self::Gpio(e) => e.errno(),
        }
    }

    /// `true` if the host should retry the probe later.
    pub const fn is_deferred(self) -> bool {
        matches!(self, Self::ProbeDeferred)
    }
}

impl From<GpioError> for DriverError {
    /// A failed line request. Deferral stays a deferral.
    fn from(err: GpioError) -> Self {
        match err {
            GpioError::ProbeDeferred => Self::ProbeDeferred,
            other => Self::GpioAcquisitionFailed(other),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::ProbeDeferred => write!(f, "probe deferred"),
            Self::GpioAcquisitionFailed(e) => write!(f, "GPIO acquisition failed: {e}"),
            Self::Gpio(e) => write!(f, "GPIO write failed: {e}"),
        }
    }
}
