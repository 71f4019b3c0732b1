//! Device-binding framework for platform drivers
//!
//! This crate provides the host side of the driver model: ACPI identifier
//! tables, the device-binding trait a driver probes against, GPIO consumer
//! lookup flags, the driver trait itself, and a registry that matches
//! devices to a registered driver and re-runs deferred probes.
//!
//! # Architecture Layers
//!
//! ```text
//! Driver crates (max98390-gpio-enable)
//!         ↓
//! Platform framework (this crate - traits + registry)
//!         ↓
//! GPIO provider / firmware tables (ACPI GpioIo resources)
//! ```
//!
//! # Lifecycle
//!
//! ```text
//!            probe Ok            remove
//! Unbound ──────────────► Bound ────────► Unbound
//!    │ ▲
//!    │ │ retry_deferred
//!    ▼ │
//! Deferred          probe Err (fatal) ──► Failed
//! ```
//!
//! # Features
//!
//! - `std`: Enable standard library support (mocks, `std::error::Error`)
//! - `tracing`: Log through `tracing` (host builds)
//! - `defmt`: Log through `defmt` and derive `defmt::Format`
//!
//! # Example
//!
//! ```no_run
//! use platform::{Device, DriverRegistry, PlatformDriver};
//!
//! fn bind_all<Drv, D>(registry: &mut DriverRegistry<Drv, D, 4>)
//! where
//!     Drv: PlatformDriver<D>,
//!     D: Device,
//! {
//!     let newly_bound = registry.retry_deferred();
//!     let _ = newly_bound;
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // ACPI IDs and errno names in doc comments
#![allow(clippy::must_use_candidate)] // accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

#[macro_use]
pub mod log;

pub mod acpi;
pub mod device;
pub mod driver;
pub mod error;
pub mod gpio;
pub mod registry;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use acpi::{acpi_match_device, AcpiDeviceId};
pub use device::{AllocError, Device};
pub use driver::{DriverInfo, ModuleInfo, PlatformDriver};
pub use error::{DriverError, GpioError};
pub use gpio::{GpioFlags, GpioLookup};
pub use registry::{BindingState, DeviceHandle, DriverRegistry, RegistryError};

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "tracing")]
    pub use tracing;
}
