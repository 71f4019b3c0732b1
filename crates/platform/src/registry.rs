//! Driver registry: device matching and the deferred-probe list
//!
//! Holds up to `N` devices and at most one registered driver. Adding a device
//! or registering the driver matches `_HID` against the driver's ACPI table
//! and runs probe. Probes that return [`DriverError::ProbeDeferred`] are
//! parked until [`DriverRegistry::retry_deferred`] is called, which is how the
//! host signals that another provider finished binding.

use heapless::Vec;

use crate::acpi::acpi_match_device;
use crate::device::Device;
use crate::driver::{DriverInfo, PlatformDriver};
use crate::error::DriverError;

/// Binding state of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingState {
    /// No driver bound (no match, not probed yet, or removed).
    Unbound,
    /// Probe asked to be retried later.
    Deferred,
    /// Probe succeeded; driver data is live.
    Bound,
    /// Probe failed with a fatal error.
    Failed(DriverError),
}

/// Reference to a device inside the registry.
///
/// Slots are reused after [`DriverRegistry::remove_device`]; the generation
/// makes a handle to the removed device stop resolving instead of aliasing
/// the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceHandle {
    index: usize,
    generation: u32,
}

/// Registry bookkeeping errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// All device slots are in use.
    Full,
    /// Handle does not refer to a live device.
    NoSuchDevice,
    /// A driver is already registered.
    AlreadyRegistered,
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "device table full"),
            Self::NoSuchDevice => write!(f, "no such device"),
            Self::AlreadyRegistered => write!(f, "driver already registered"),
        }
    }
}

struct Binding<D, T> {
    dev: D,
    state: BindingState,
    data: Option<T>,
}

struct Slot<D, T> {
    generation: u32,
    binding: Option<Binding<D, T>>,
}

/// Device table plus the registered driver.
pub struct DriverRegistry<Drv, D, const N: usize>
where
    Drv: PlatformDriver<D>,
    D: Device,
{
    driver: Option<Drv>,
    slots: Vec<Slot<D, Drv::Data>, N>,
}

impl<Drv, D, const N: usize> DriverRegistry<Drv, D, N>
where
    Drv: PlatformDriver<D>,
    D: Device,
{
    /// Empty registry with no driver.
    pub const fn new() -> Self {
        Self {
            driver: None,
            slots: Vec::new(),
        }
    }

    /// Register `driver` and try to bind every unbound device.
    ///
    /// Returns the number of devices bound by this call.
    pub fn register(&mut self, driver: Drv) -> Result<usize, RegistryError> {
        if self.driver.is_some() {
            return Err(RegistryError::AlreadyRegistered);
        }
        let driver = self.driver.insert(driver);
        let bound = self
            .slots
            .iter_mut()
            .filter_map(|s| s.binding.as_mut())
            .filter(|b| b.state != BindingState::Bound)
            .map(|b| attach(driver, b))
            .filter(|state| *state == BindingState::Bound)
            .count();
        Ok(bound)
    }

    /// Unbind every device and hand the driver back (module unload).
    pub fn unregister(&mut self) -> Option<Drv> {
        let mut driver = self.driver.take()?;
        for binding in self.slots.iter_mut().filter_map(|s| s.binding.as_mut()) {
            detach(&mut driver, binding);
        }
        Some(driver)
    }

    /// Add an enumerated device and probe it if a driver is registered.
    pub fn add_device(&mut self, dev: D) -> Result<DeviceHandle, RegistryError> {
        let binding = Binding {
            dev,
            state: BindingState::Unbound,
            data: None,
        };
        let free = self.slots.iter().position(|s| s.binding.is_none());
        let handle = match free.and_then(|index| Some((index, self.slots.get_mut(index)?))) {
            Some((index, slot)) => {
                slot.binding = Some(binding);
                DeviceHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len();
                self.slots
                    .push(Slot {
                        generation: 0,
                        binding: Some(binding),
                    })
                    .map_err(|_| RegistryError::Full)?;
                DeviceHandle {
                    index,
                    generation: 0,
                }
            }
        };
        if let (Some(driver), Some(binding)) = (
            self.driver.as_mut(),
            self.slots
                .get_mut(handle.index)
                .and_then(|s| s.binding.as_mut()),
        ) {
            attach(driver, binding);
        }
        Ok(handle)
    }

    /// Remove a device, running the driver's remove if it was bound.
    ///
    /// The device is returned to the caller; driver data is dropped.
    pub fn remove_device(&mut self, handle: DeviceHandle) -> Result<D, RegistryError> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)
            .ok_or(RegistryError::NoSuchDevice)?;
        let mut binding = slot.binding.take().ok_or(RegistryError::NoSuchDevice)?;
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(driver) = self.driver.as_mut() {
            detach(driver, &mut binding);
        }
        Ok(binding.dev)
    }

    /// Re-run probe for every deferred device.
    ///
    /// Returns the number of devices that became bound.
    pub fn retry_deferred(&mut self) -> usize {
        let Some(driver) = self.driver.as_mut() else {
            return 0;
        };
        self.slots
            .iter_mut()
            .filter_map(|s| s.binding.as_mut())
            .filter(|b| b.state == BindingState::Deferred)
            .map(|b| attach(driver, b))
            .filter(|state| *state == BindingState::Bound)
            .count()
    }

    /// Binding state of `handle`.
    pub fn state(&self, handle: DeviceHandle) -> Option<BindingState> {
        self.binding(handle).map(|b| b.state)
    }

    /// Device behind `handle`.
    pub fn device(&self, handle: DeviceHandle) -> Option<&D> {
        self.binding(handle).map(|b| &b.dev)
    }

    /// Driver data for `handle`, present only while bound.
    pub fn data(&self, handle: DeviceHandle) -> Option<&Drv::Data> {
        self.binding(handle).and_then(|b| b.data.as_ref())
    }

    /// The registered driver.
    pub fn driver(&self) -> Option<&Drv> {
        self.driver.as_ref()
    }

    /// Static info of the registered driver.
    pub fn driver_info(&self) -> Option<DriverInfo> {
        self.driver.as_ref().map(|_| <Drv as PlatformDriver<D>>::INFO)
    }

    /// Number of devices currently in the table.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.binding.is_some()).count()
    }

    /// `true` if no devices are in the table.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of devices waiting on a deferred probe.
    pub fn deferred_count(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.binding.as_ref())
            .filter(|b| b.state == BindingState::Deferred)
            .count()
    }

    fn binding(&self, handle: DeviceHandle) -> Option<&Binding<D, Drv::Data>> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.binding.as_ref())
    }
}

impl<Drv, D, const N: usize> Default for DriverRegistry<Drv, D, N>
where
    Drv: PlatformDriver<D>,
    D: Device,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Match and probe one device. Unmatched devices keep their state.
fn attach<Drv, D>(driver: &mut Drv, binding: &mut Binding<D, Drv::Data>) -> BindingState
where
    Drv: PlatformDriver<D>,
    D: Device,
{
    let info = <Drv as PlatformDriver<D>>::INFO;
    let Some(id) = acpi_match_device(info.acpi_match_table, binding.dev.acpi_hid()) else {
        return binding.state;
    };
    dev_dbg!(binding.dev.name(), "matched {} to driver {}", id.id(), info.name);

    binding.state = match driver.probe(&mut binding.dev, id) {
        Ok(data) => {
            binding.data = Some(data);
            BindingState::Bound
        }
        Err(DriverError::ProbeDeferred) => {
            dev_info!(binding.dev.name(), "probe deferred, will retry");
            BindingState::Deferred
        }
        Err(err) => {
            dev_err!(binding.dev.name(), "probe failed with error {}", err.errno());
            BindingState::Failed(err)
        }
    };
    binding.state
}

/// Run remove for a bound device, then drop its driver data.
fn detach<Drv, D>(driver: &mut Drv, binding: &mut Binding<D, Drv::Data>)
where
    Drv: PlatformDriver<D>,
    D: Device,
{
    if binding.state == BindingState::Bound {
        if let Err(err) = driver.remove(&mut binding.dev, binding.data.as_mut()) {
            dev_warn!(binding.dev.name(), "remove returned error {}", err.errno());
        }
    }
    binding.data = None;
    binding.state = BindingState::Unbound;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::acpi::AcpiDeviceId;
    use crate::driver::ModuleInfo;
    use crate::error::GpioError;
    use crate::gpio::GpioFlags;
    use crate::mocks::{MockDevice, MockLine};
    use embedded_hal::digital::PinState;

    /// Claims the "reset" line high and counts callbacks.
    #[derive(Default)]
    struct ResetHolder {
        probes: usize,
        removes: usize,
        removes_with_data: usize,
    }

    impl PlatformDriver<MockDevice> for ResetHolder {
        type Data = MockLine;

        const INFO: DriverInfo = DriverInfo {
            name: "reset_holder",
            acpi_match_table: &[AcpiDeviceId::new("TEST0001"), AcpiDeviceId::new("TEST0002")],
            module: ModuleInfo {
                description: "test driver",
                author: "tests",
                license: "GPL",
            },
        };

        fn probe(
            &mut self,
            dev: &mut MockDevice,
            _id: &AcpiDeviceId,
        ) -> Result<MockLine, DriverError> {
            self.probes += 1;
            Ok(dev.gpiod_get_index("reset", 0, GpioFlags::OutHigh)?)
        }

        fn remove(
            &mut self,
            _dev: &mut MockDevice,
            data: Option<&mut MockLine>,
        ) -> Result<(), DriverError> {
            self.removes += 1;
            if data.is_some() {
                self.removes_with_data += 1;
            }
            Ok(())
        }
    }

    type Registry = DriverRegistry<ResetHolder, MockDevice, 4>;

    fn device(hid: &str) -> MockDevice {
        MockDevice::new("test-dev", hid).with_gpio("reset")
    }

    #[test]
    fn test_add_before_register_binds_on_register() {
        let mut reg = Registry::new();
        let h = reg.add_device(device("TEST0001")).unwrap();
        assert_eq!(reg.state(h), Some(BindingState::Unbound));

        assert_eq!(reg.register(ResetHolder::default()), Ok(1));
        assert_eq!(reg.state(h), Some(BindingState::Bound));
        assert_eq!(reg.data(h).and_then(MockLine::state), Some(PinState::High));
    }

    #[test]
    fn test_add_after_register_probes_immediately() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let h = reg.add_device(device("TEST0002")).unwrap();
        assert_eq!(reg.state(h), Some(BindingState::Bound));
        assert_eq!(reg.driver().unwrap().probes, 1);
    }

    #[test]
    fn test_unmatched_device_is_never_probed() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let h = reg.add_device(device("OTHR0001")).unwrap();
        assert_eq!(reg.state(h), Some(BindingState::Unbound));
        assert_eq!(reg.driver().unwrap().probes, 0);
        assert!(reg.data(h).is_none());
    }

    #[test]
    fn test_deferred_probe_is_retried() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let dev = device("TEST0001").with_lookup_errors("reset", [GpioError::ProbeDeferred]);
        let h = reg.add_device(dev).unwrap();
        assert_eq!(reg.state(h), Some(BindingState::Deferred));
        assert_eq!(reg.deferred_count(), 1);
        assert!(reg.data(h).is_none());

        assert_eq!(reg.retry_deferred(), 1);
        assert_eq!(reg.state(h), Some(BindingState::Bound));
        assert_eq!(reg.deferred_count(), 0);
        assert_eq!(reg.driver().unwrap().probes, 2);
    }

    #[test]
    fn test_retry_leaves_bound_and_failed_alone() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        reg.add_device(device("TEST0001")).unwrap();
        let failed = reg.add_device(MockDevice::new("no-gpio", "TEST0001")).unwrap();
        assert_eq!(
            reg.state(failed),
            Some(BindingState::Failed(DriverError::GpioAcquisitionFailed(
                GpioError::NotFound
            )))
        );
        assert_eq!(reg.retry_deferred(), 0);
        assert_eq!(reg.driver().unwrap().probes, 2);
    }

    #[test]
    fn test_retry_without_driver_is_noop() {
        let mut reg = Registry::new();
        reg.add_device(device("TEST0001")).unwrap();
        assert_eq!(reg.retry_deferred(), 0);
    }

    #[test]
    fn test_remove_device_calls_remove_with_data() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let h = reg.add_device(device("TEST0001")).unwrap();
        let dev = reg.remove_device(h).unwrap();
        assert_eq!(reg.driver().unwrap().removes, 1);
        assert_eq!(reg.driver().unwrap().removes_with_data, 1);
        assert!(!dev.is_claimed("reset"), "line released with the binding");
        assert_eq!(reg.state(h), None);
        assert_eq!(reg.remove_device(h).err(), Some(RegistryError::NoSuchDevice));
    }

    #[test]
    fn test_remove_unbound_device_skips_driver_remove() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let h = reg.add_device(MockDevice::new("no-gpio", "TEST0001")).unwrap();
        reg.remove_device(h).unwrap();
        assert_eq!(reg.driver().unwrap().removes, 0);
    }

    #[test]
    fn test_unregister_removes_every_bound_device() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let a = reg.add_device(device("TEST0001")).unwrap();
        let b = reg.add_device(device("TEST0002")).unwrap();
        let driver = reg.unregister().unwrap();
        assert_eq!(driver.removes, 2);
        assert_eq!(reg.state(a), Some(BindingState::Unbound));
        assert_eq!(reg.state(b), Some(BindingState::Unbound));
        assert!(reg.driver_info().is_none());
        assert!(reg.unregister().is_none());
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        assert_eq!(
            reg.register(ResetHolder::default()),
            Err(RegistryError::AlreadyRegistered)
        );
        assert_eq!(reg.driver_info().map(|i| i.name), Some("reset_holder"));
    }

    #[test]
    fn test_table_full_and_slot_reuse() {
        let mut reg = Registry::new();
        let handles: std::vec::Vec<_> = (0..4)
            .map(|_| reg.add_device(device("OTHR0001")).unwrap())
            .collect();
        assert_eq!(reg.len(), 4);
        assert_eq!(
            reg.add_device(device("OTHR0001")).err(),
            Some(RegistryError::Full)
        );
        reg.remove_device(handles[1]).unwrap();
        let reused = reg.add_device(device("OTHR0001")).unwrap();
        assert_ne!(reused, handles[1]);
        assert_eq!(reg.len(), 4);
        assert_eq!(
            reg.remove_device(handles[1]).err(),
            Some(RegistryError::NoSuchDevice)
        );
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn test_stale_handle_does_not_reach_slot_successor() {
        let mut reg = Registry::new();
        reg.register(ResetHolder::default()).unwrap();
        let old = reg.add_device(device("TEST0001")).unwrap();
        reg.remove_device(old).unwrap();

        let new = reg.add_device(MockDevice::new("successor", "OTHR0001")).unwrap();
        assert_eq!(reg.len(), 1, "slot reused");
        assert_eq!(reg.state(old), None);
        assert!(reg.device(old).is_none());
        assert!(reg.data(old).is_none());
        assert_eq!(reg.remove_device(old).err(), Some(RegistryError::NoSuchDevice));

        assert_eq!(reg.device(new).map(MockDevice::name), Some("successor"));
        assert_eq!(reg.driver().unwrap().removes, 1);
    }
}
