//! MAX98390 amplifier power enable
//!
//! Some laptops (Samsung Galaxy Book5 Pro) declare the MAX98390 speaker
//! amplifiers' power-enable line as an ACPI `GpioIo` resource but nothing in
//! the audio stack drives it, so the amplifiers stay unpowered. This driver
//! binds to the amplifier's ACPI node, asserts the line once at probe, and
//! leaves it asserted.
//!
//! # Signal Path
//!
//! ```text
//! PCH GPIO / expander ──enable──► MAX98390 EN ──► speaker amplifiers powered
//! ```
//!
//! # Enable Pin Logic
//!
//! ```text
//! Pin high → amplifier powered
//! Pin low  → amplifier unpowered (requested low, then driven high at probe)
//! ```
//!
//! # Lifecycle
//!
//! | Event                        | Effect on the enable line           |
//! |------------------------------|-------------------------------------|
//! | probe, `"enable"` found      | requested low, set high, 10 ms wait |
//! | probe, only `"amp-enable"`   | same, on the alternate line         |
//! | probe, provider not ready    | untouched, probe deferred           |
//! | probe, neither name found    | untouched, probe fails              |
//! | probe, setting high fails    | left low, probe fails (`Gpio`)      |
//! | remove / module unload       | untouched (stays high)              |
//!
//! # Example
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use max98390_gpio_enable::Max98390GpioEnable;
//! use platform::{Device, DriverRegistry, RegistryError};
//!
//! fn load<D: Device, T: DelayNs>(
//!     registry: &mut DriverRegistry<Max98390GpioEnable<T>, D, 4>,
//!     delay: T,
//! ) -> Result<usize, RegistryError> {
//!     registry.register(Max98390GpioEnable::new(delay))
//! }
//! ```
//!
//! # Features
//!
//! - `std`: Standard library support (platform mocks)
//! - `tracing`: Log through `tracing`
//! - `defmt`: Log through `defmt`

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod driver;
pub mod state;

pub use config::{DRIVER_INFO, DRIVER_NAME, MAX98390_ACPI_IDS, POWER_UP_SETTLE_MS};
pub use driver::Max98390GpioEnable;
pub use state::PowerEnableState;
