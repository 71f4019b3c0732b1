//! Driver identity and board constants
//!
//! Every name, ID and timing the driver uses is defined here; the probe path
//! references these rather than hardcoding values.

use platform::{AcpiDeviceId, DriverInfo, GpioLookup, ModuleInfo};

/// Name registered with the host and used in log lines.
pub const DRIVER_NAME: &str = "max98390_gpio_enable";

/// ACPI hardware IDs firmware uses for the MAX98390 amplifier.
pub const MAX98390_ACPI_IDS: &[AcpiDeviceId] = &[
    AcpiDeviceId::new("MAX98390"),
    AcpiDeviceId::new("MXIM8390"),
];

/// Primary enable line: `GpioIo` resource 0, connection `"enable"`.
pub const ENABLE_GPIO: GpioLookup = GpioLookup::new("enable", 0);

/// Alternate name some firmware tables use for the same line.
pub const AMP_ENABLE_GPIO: GpioLookup = GpioLookup::new("amp-enable", 0);

/// Time the amplifier needs after the enable line rises before it is usable.
pub const POWER_UP_SETTLE_MS: u32 = 10;

/// Module metadata.
pub const MODULE_INFO: ModuleInfo = ModuleInfo {
    description: "Samsung Galaxy Book5 Pro MAX98390 GPIO Power Enable",
    author: "Samsung Galaxy Book5 Linux Driver Project",
    license: "GPL",
};

/// Descriptor handed to the registry.
pub const DRIVER_INFO: DriverInfo = DriverInfo {
    name: DRIVER_NAME,
    acpi_match_table: MAX98390_ACPI_IDS,
    module: MODULE_INFO,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acpi_ids_are_well_formed() {
        assert_eq!(MAX98390_ACPI_IDS.len(), 2);
        for id in MAX98390_ACPI_IDS {
            assert!(id.is_valid(), "{} is not a valid ACPI ID", id.id());
        }
    }

    #[test]
    fn test_acpi_ids() {
        let ids: std::vec::Vec<_> = MAX98390_ACPI_IDS.iter().map(AcpiDeviceId::id).collect();
        assert_eq!(ids, ["MAX98390", "MXIM8390"]);
    }

    #[test]
    fn test_gpio_lookups_use_index_zero() {
        assert_eq!(ENABLE_GPIO.con_id, "enable");
        assert_eq!(ENABLE_GPIO.index, 0);
        assert_eq!(AMP_ENABLE_GPIO.con_id, "amp-enable");
        assert_eq!(AMP_ENABLE_GPIO.index, 0);
    }

    #[test]
    fn test_driver_info_points_at_table() {
        assert_eq!(DRIVER_INFO.name, "max98390_gpio_enable");
        assert_eq!(DRIVER_INFO.acpi_match_table, MAX98390_ACPI_IDS);
        assert_eq!(DRIVER_INFO.module.license, "GPL");
    }
}
