//! ACPI device identifier tables
//!
//! A driver publishes a static slice of [`AcpiDeviceId`]; the registry
//! compares each device's `_HID` against it before calling probe.

/// One entry of an ACPI match table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcpiDeviceId {
    id: &'static str,
    driver_data: usize,
}

impl AcpiDeviceId {
    /// Entry with no driver data.
    pub const fn new(id: &'static str) -> Self {
        Self { id, driver_data: 0 }
    }

    /// Entry carrying an opaque per-ID value handed back to probe.
    pub const fn with_data(id: &'static str, driver_data: usize) -> Self {
        Self { id, driver_data }
    }

    /// Hardware ID string (e.g. `"MAX98390"`).
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Driver data for this entry.
    pub const fn driver_data(&self) -> usize {
        self.driver_data
    }

    /// `true` if `id` is a well-formed hardware ID.
    ///
    /// ACPI IDs are 8 characters (4 vendor + 4 hex product), PNP IDs are 7
    /// (3 vendor + 4 hex product). Vendor part is upper-case letters, digits
    /// or `_`.
    pub fn is_valid(&self) -> bool {
        is_valid_hid(self.id)
    }
}

/// Check the shape of an ACPI or PNP hardware ID.
pub fn is_valid_hid(hid: &str) -> bool {
    if !hid.is_ascii() {
        return false;
    }
    let vendor_len = match hid.len() {
        8 => 4,
        7 => 3,
        _ => return false,
    };
    let (vendor, product) = hid.split_at(vendor_len);
    vendor
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
        && product
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
}

/// Find the table entry matching a device's hardware ID.
///
/// Comparison is exact and case-sensitive, as the firmware reports `_HID`
/// verbatim.
pub fn acpi_match_device<'a>(table: &'a [AcpiDeviceId], hid: &str) -> Option<&'a AcpiDeviceId> {
    table.iter().find(|entry| entry.id == hid)
}
