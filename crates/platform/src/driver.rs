//! Platform driver trait and static metadata

use crate::acpi::AcpiDeviceId;
use crate::device::Device;
use crate::error::DriverError;

/// Module-level metadata (description, author, license).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleInfo {
    /// One-line description.
    pub description: &'static str,
    /// Author or maintaining project.
    pub author: &'static str,
    /// License identifier.
    pub license: &'static str,
}

/// Static description a driver hands to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverInfo {
    /// Short driver name for the registry and log lines.
    pub name: &'static str,
    /// ACPI IDs this driver binds to.
    pub acpi_match_table: &'static [AcpiDeviceId],
    /// Module metadata.
    pub module: ModuleInfo,
}

/// A driver that binds to platform devices of type `D`.
///
/// The registry never calls [`probe`](Self::probe) and
/// [`remove`](Self::remove) concurrently for one device: both take
/// `&mut self` and the device by `&mut`.
pub trait PlatformDriver<D: Device> {
    /// Per-binding state created by probe and handed back to remove.
    type Data;

    /// Driver name and match table.
    const INFO: DriverInfo;

    /// Bind to `dev`, which matched table entry `id`.
    ///
    /// Returning [`DriverError::ProbeDeferred`] asks the registry to retry
    /// later; any other error leaves the device unbound.
    fn probe(&mut self, dev: &mut D, id: &AcpiDeviceId) -> Result<Self::Data, DriverError>;

    /// Unbind from `dev`. `data` is `None` if probe never completed.
    fn remove(&mut self, dev: &mut D, data: Option<&mut Self::Data>) -> Result<(), DriverError>;
}
